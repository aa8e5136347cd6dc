//! The autonomous reflection loop: collect memory, run observers, consult
//! the oracle once, evaluate each observation through the decision policy,
//! dispatch escalations and the action handler, and persist a cycle summary.
//!
//! One [`ReflectionLoop`] owns a single background worker bound to a caller
//! supplied [`CancellationToken`]. `start` fires one cycle immediately, then
//! one on every `cycle_interval` tick, until the token is cancelled.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod parse;
mod record;
mod state;

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use reflect_config::ReflectionLoopConfig;
use reflect_core::AgentId;
use reflect_memory::{MemoryEntry, MemorySink};
use reflect_oracle::{Oracle, OracleRequest};
use reflect_policy::{DecisionKind, DecisionPolicy, Situation};
use reflect_registry::{Observation, ObserverRegistry};
use reflect_selfmodel::SelfModel;
use reflect_sinks::{Action, ActionHandler, Escalation, EscalationLevel, EscalationSink};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub use error::{LoopError, LoopResult};
pub use record::CycleRecord;

const NO_OBSERVATIONS: &str = "[No monitor observations — all clear]";
const MEMORY_EXCERPT_LIMIT: usize = 200;

/// The orchestrator tying together the registry, policy, self model, oracle,
/// and every optional sink into one periodic worker.
pub struct ReflectionLoop {
    config: ReflectionLoopConfig,
    agent_id: AgentId,
    registry: Arc<ObserverRegistry>,
    policy: Arc<DecisionPolicy>,
    self_model: Arc<SelfModel>,
    oracle: Arc<dyn Oracle>,
    memory: Option<Arc<dyn MemorySink>>,
    escalation: Option<Arc<dyn EscalationSink>>,
    handler: Option<Arc<dyn ActionHandler>>,
    state: Mutex<state::LoopState>,
}

impl ReflectionLoop {
    /// Builds a reflection loop from its required collaborators. Memory,
    /// escalation, and the action handler are optional and attached with
    /// `with_*` builders.
    #[must_use]
    pub fn new(
        config: ReflectionLoopConfig,
        agent_id: AgentId,
        registry: Arc<ObserverRegistry>,
        policy: Arc<DecisionPolicy>,
        self_model: Arc<SelfModel>,
        oracle: Arc<dyn Oracle>,
    ) -> Self {
        Self {
            config,
            agent_id,
            registry,
            policy,
            self_model,
            oracle,
            memory: None,
            escalation: None,
            handler: None,
            state: state::LoopState::new(),
        }
    }

    /// Attaches a memory sink used to gather cycle context and persist cycle
    /// summaries.
    #[must_use]
    pub fn with_memory(mut self, memory: Arc<dyn MemorySink>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Attaches the sink escalated situations are dispatched to.
    #[must_use]
    pub fn with_escalation_sink(mut self, escalation: Arc<dyn EscalationSink>) -> Self {
        self.escalation = Some(escalation);
        self
    }

    /// Attaches the fire-and-forget handler invoked for non-idle actions.
    #[must_use]
    pub fn with_action_handler(mut self, handler: Arc<dyn ActionHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Returns the agent name this loop identifies itself as.
    #[must_use]
    pub fn agent_name(&self) -> &str {
        &self.config.agent_name
    }

    /// Returns `true` while the background worker is running.
    pub async fn is_running(&self) -> bool {
        self.state.lock().await.is_running()
    }

    /// Returns the number of cycles completed so far.
    pub async fn cycle_count(&self) -> u64 {
        self.state.lock().await.cycle_count()
    }

    /// Returns the time of the most recently completed cycle, if any.
    pub async fn last_cycle(&self) -> Option<chrono::DateTime<Utc>> {
        self.state.lock().await.last_cycle()
    }

    /// Starts the background worker: one cycle immediately, then one per
    /// `cycle_interval` tick, until `cancellation` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::AlreadyRunning`] if the loop is already started.
    pub async fn start(self: &Arc<Self>, cancellation: CancellationToken) -> LoopResult<()> {
        {
            let mut guard = self.state.lock().await;
            if guard.is_running() {
                return Err(LoopError::AlreadyRunning);
            }
            guard.set_running(true);
        }

        let worker = Arc::clone(self);
        tokio::spawn(async move {
            worker.run_worker(cancellation).await;
        });

        Ok(())
    }

    async fn run_worker(self: Arc<Self>, cancellation: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.cycle_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancellation.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if cancellation.is_cancelled() {
                break;
            }

            self.run_cycle(cancellation.clone()).await;
        }

        let mut guard = self.state.lock().await;
        guard.set_running(false);
        info!(agent = %self.config.agent_name, "reflection loop stopped");
    }

    /// Runs exactly one cycle, skipping it if the hourly rate limit is
    /// already exhausted. Exposed for callers driving the loop manually
    /// (tests, one-shot CLIs) instead of through [`Self::start`].
    pub async fn run_cycle(&self, cancellation: CancellationToken) {
        let now = Utc::now();

        {
            let mut guard = self.state.lock().await;
            let recent = guard.prune_and_count_recent(now);
            if self.config.max_cycles_per_hour > 0
                && recent >= self.config.max_cycles_per_hour as usize
            {
                warn!(
                    agent = %self.config.agent_name,
                    recent,
                    limit = self.config.max_cycles_per_hour,
                    "skipping cycle: hourly rate limit reached"
                );
                return;
            }
        }

        let started = Instant::now();

        let memory_context = self.collect_memory().await;
        let (observations, aggregate_error) = self.registry.check_all(cancellation.clone()).await;
        if let Some(err) = aggregate_error {
            warn!(agent = %self.config.agent_name, error = %err, "observer fan-out reported failures");
        }

        let action = match self.reflect(&memory_context, &observations, cancellation.clone()).await {
            Ok(action) => action,
            Err(err) => {
                error!(agent = %self.config.agent_name, error = %err, "oracle call failed, aborting cycle");
                return;
            }
        };

        for observation in &observations {
            self.evaluate_observation(observation).await;
        }

        if action.requires_handling() {
            if let Some(handler) = self.handler.clone() {
                let action = action.clone();
                let token = cancellation.clone();
                tokio::spawn(async move {
                    handler.handle(token, action).await;
                });
            }
        }

        let record = CycleRecord::new(action.kind(), observations.len(), started.elapsed(), action.payload());
        self.persist_cycle(&record).await;

        let mut guard = self.state.lock().await;
        guard.record_cycle(now);
    }

    async fn collect_memory(&self) -> Vec<String> {
        let Some(memory) = &self.memory else {
            return Vec::new();
        };

        match memory.search("", self.config.memory_top_k).await {
            Ok(entries) => entries.iter().map(|entry| format_memory_entry(entry)).collect(),
            Err(err) => {
                warn!(agent = %self.config.agent_name, error = %err, "memory search failed, continuing with empty context");
                Vec::new()
            }
        }
    }

    async fn reflect(
        &self,
        memory_context: &[String],
        observations: &[Observation],
        cancellation: CancellationToken,
    ) -> reflect_oracle::OracleResult<Action> {
        let system_prompt = self.system_prompt();
        let user_prompt = self.user_prompt(memory_context, observations);
        let request = OracleRequest::single_turn(system_prompt, user_prompt, 256, 0.3);

        let response = self.oracle.complete(request, cancellation).await?;
        Ok(parse::parse_action(&response.text))
    }

    fn system_prompt(&self) -> String {
        let capabilities = self.self_model.available_capabilities();
        let mut prompt = format!(
            "You are {}, an autonomous platform-automation agent.",
            self.config.agent_name
        );
        if capabilities.is_empty() {
            prompt.push_str(" You currently have no registered capabilities.");
        } else {
            let names = capabilities
                .iter()
                .map(reflect_core::CapabilityId::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            let _ = write!(prompt, " Your available capabilities are: {names}.");
        }
        prompt
    }

    fn user_prompt(&self, memory_context: &[String], observations: &[Observation]) -> String {
        let mut prompt = format!("Current time: {}\n", now_rfc3339());
        let _ = writeln!(prompt, "Load: {}", self.self_model.load().summary());

        if !memory_context.is_empty() {
            prompt.push_str("Recent memory:\n");
            for line in memory_context {
                let _ = writeln!(prompt, "{line}");
            }
        }

        if observations.is_empty() {
            prompt.push_str(NO_OBSERVATIONS);
            prompt.push('\n');
        } else {
            prompt.push_str("Monitor observations:\n");
            for observation in observations {
                let _ = writeln!(
                    prompt,
                    "- [{}] ({}) {}",
                    observation.severity().value(),
                    observation.situation_id(),
                    observation.message()
                );
            }
        }

        prompt.push_str("What should you do right now?");
        prompt
    }

    async fn evaluate_observation(&self, observation: &Observation) {
        let mut situation = Situation::new(
            observation.situation_id().clone(),
            observation.severity(),
            observation.message(),
        )
        .with_timestamp(observation.observed_at());
        for (key, value) in observation.details() {
            situation = situation.with_context(key.clone(), value.clone());
        }

        let decision = self.policy.evaluate(&situation);
        info!(
            agent = %self.config.agent_name,
            situation_id = %observation.situation_id(),
            decision = ?decision.kind(),
            reason = decision.reason(),
            "observation evaluated"
        );

        if decision.kind() == DecisionKind::Escalate {
            self.dispatch_escalation(observation, decision.reason()).await;
        }
    }

    async fn dispatch_escalation(&self, observation: &Observation, reason: &str) {
        let Some(sink) = &self.escalation else {
            return;
        };

        let escalation = Escalation::new(
            EscalationLevel::Warning,
            format!("Situation: {}", observation.situation_id()),
            format!("[{}] {} — {reason}", observation.situation_id(), observation.message()),
            self.config.agent_name.clone(),
        );

        if let Err(err) = sink.notify(escalation).await {
            warn!(
                agent = %self.config.agent_name,
                situation_id = %observation.situation_id(),
                error = %err,
                "escalation dispatch failed"
            );
        }
    }

    async fn persist_cycle(&self, record: &CycleRecord) {
        let Some(memory) = &self.memory else {
            return;
        };

        let entry = match MemoryEntry::builder(self.agent_id, record.to_memory_text())
            .tag("cycle-summary")
            .and_then(reflect_memory::MemoryEntryBuilder::build)
        {
            Ok(entry) => entry,
            Err(err) => {
                warn!(agent = %self.config.agent_name, error = %err, "failed to build cycle summary entry");
                return;
            }
        };

        if let Err(err) = memory.save(entry).await {
            warn!(agent = %self.config.agent_name, error = %err, "failed to persist cycle summary");
        }
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

fn format_memory_entry(entry: &MemoryEntry) -> String {
    let content = entry.content();
    let truncated = if content.chars().count() > MEMORY_EXCERPT_LIMIT {
        let mut excerpt = content.chars().take(MEMORY_EXCERPT_LIMIT).collect::<String>();
        excerpt.push('\u{2026}');
        excerpt
    } else {
        content.to_owned()
    };
    format!(
        "- [{}] (agent={}) {}",
        entry.created_at().to_rfc3339(),
        entry.agent_id(),
        truncated
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reflect_core::{ObserverId, Severity, SituationId};
    use reflect_memory::{VolatileConfig, VolatileMemorySink};
    use reflect_oracle::static_oracle::StaticOracle;
    use reflect_registry::Observer;
    use std::num::NonZeroUsize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedObserver {
        id: ObserverId,
        situation_id: &'static str,
        severity: u8,
    }

    #[async_trait]
    impl Observer for FixedObserver {
        fn id(&self) -> &ObserverId {
            &self.id
        }

        async fn check(
            &self,
            _cancellation: CancellationToken,
        ) -> (Vec<Observation>, Option<reflect_registry::ObserverError>) {
            let observation = Observation::new(
                self.id.clone(),
                SituationId::new(self.situation_id).unwrap(),
                Severity::new(self.severity).unwrap(),
                "test observation",
            );
            (vec![observation], None)
        }
    }

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ActionHandler for CountingHandler {
        async fn handle(&self, _cancellation: CancellationToken, _action: Action) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn test_config() -> ReflectionLoopConfig {
        ReflectionLoopConfig {
            cycle_interval: Duration::from_millis(5),
            memory_top_k: 10,
            max_cycles_per_hour: 0,
            agent_name: "test-agent".to_owned(),
        }
    }

    fn test_loop(oracle_reply: &str) -> Arc<ReflectionLoop> {
        let registry = Arc::new(ObserverRegistry::new());
        let policy = Arc::new(DecisionPolicy::new(3, 7).unwrap());
        let self_model = Arc::new(SelfModel::new());
        let oracle: Arc<dyn Oracle> = Arc::new(StaticOracle::reply(oracle_reply));
        let memory: Arc<dyn MemorySink> = Arc::new(VolatileMemorySink::new(VolatileConfig::new(
            NonZeroUsize::new(64).unwrap(),
        )));

        Arc::new(
            ReflectionLoop::new(test_config(), AgentId::random(), registry, policy, self_model, oracle)
                .with_memory(memory),
        )
    }

    #[tokio::test]
    async fn idle_cycle_with_empty_registry_persists_one_summary() {
        let reflection_loop = test_loop("IDLE: nothing to do");

        reflection_loop.run_cycle(CancellationToken::new()).await;

        let memory = reflection_loop.memory.clone().unwrap();
        let entries = memory.search("cycle", 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].content().contains("action=Idle"));
    }

    #[tokio::test]
    async fn handle_self_does_not_escalate() {
        let registry = Arc::new(ObserverRegistry::new());
        registry
            .register(Arc::new(FixedObserver {
                id: ObserverId::new("ci-poller").unwrap(),
                situation_id: "ci_slow",
                severity: 4,
            }))
            .unwrap();

        let policy = Arc::new(DecisionPolicy::new(2, 7).unwrap());
        let self_model = Arc::new(SelfModel::new());
        let oracle: Arc<dyn Oracle> = Arc::new(StaticOracle::reply("GOAL: investigate ci"));
        let calls = Arc::new(AtomicUsize::new(0));
        let handler: Arc<dyn ActionHandler> = Arc::new(CountingHandler { calls: calls.clone() });

        let reflection_loop = Arc::new(
            ReflectionLoop::new(test_config(), AgentId::random(), registry, policy, self_model, oracle)
                .with_action_handler(handler),
        );

        reflection_loop.run_cycle(CancellationToken::new()).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn escalates_by_severity_and_notifies() {
        let registry = Arc::new(ObserverRegistry::new());
        registry
            .register(Arc::new(FixedObserver {
                id: ObserverId::new("host-health").unwrap(),
                situation_id: "prod_down",
                severity: 9,
            }))
            .unwrap();

        let policy = Arc::new(DecisionPolicy::new(3, 7).unwrap());
        let self_model = Arc::new(SelfModel::new());
        let oracle: Arc<dyn Oracle> = Arc::new(StaticOracle::reply("ESCALATE: prod is down"));

        struct RecordingSink {
            titles: Mutex<Vec<String>>,
        }

        #[async_trait]
        impl EscalationSink for RecordingSink {
            async fn notify(&self, escalation: Escalation) -> reflect_sinks::SinkResult<()> {
                self.titles.lock().await.push(escalation.title);
                Ok(())
            }
        }

        let sink = Arc::new(RecordingSink { titles: Mutex::new(Vec::new()) });
        let reflection_loop = Arc::new(
            ReflectionLoop::new(test_config(), AgentId::random(), registry, policy, self_model, oracle)
                .with_escalation_sink(sink.clone()),
        );

        reflection_loop.run_cycle(CancellationToken::new()).await;

        let titles = sink.titles.lock().await;
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0], "Situation: prod_down");
    }

    #[tokio::test]
    async fn override_wins_and_suppresses_escalation() {
        let registry = Arc::new(ObserverRegistry::new());
        registry
            .register(Arc::new(FixedObserver {
                id: ObserverId::new("noisy").unwrap(),
                situation_id: "always_ignore",
                severity: 9,
            }))
            .unwrap();

        let policy = Arc::new(DecisionPolicy::new(3, 7).unwrap());
        policy.set_override(
            SituationId::new("always_ignore").unwrap(),
            reflect_policy::Decision::ignore("override"),
        );

        let self_model = Arc::new(SelfModel::new());
        let oracle: Arc<dyn Oracle> = Arc::new(StaticOracle::reply("IDLE: nothing to do"));

        struct CountingSink {
            calls: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl EscalationSink for CountingSink {
            async fn notify(&self, _escalation: Escalation) -> reflect_sinks::SinkResult<()> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let sink = Arc::new(CountingSink { calls: calls.clone() });
        let reflection_loop = Arc::new(
            ReflectionLoop::new(test_config(), AgentId::random(), registry, policy, self_model, oracle)
                .with_escalation_sink(sink),
        );

        reflection_loop.run_cycle(CancellationToken::new()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oracle_failure_aborts_cycle_without_bookkeeping() {
        struct FailingOracle;

        #[async_trait]
        impl Oracle for FailingOracle {
            async fn complete(
                &self,
                _request: OracleRequest,
                _cancellation: CancellationToken,
            ) -> reflect_oracle::OracleResult<reflect_oracle::OracleResponse> {
                Err(reflect_oracle::OracleError::transport("connection refused"))
            }
        }

        let registry = Arc::new(ObserverRegistry::new());
        let policy = Arc::new(DecisionPolicy::new(3, 7).unwrap());
        let self_model = Arc::new(SelfModel::new());
        let oracle: Arc<dyn Oracle> = Arc::new(FailingOracle);

        let reflection_loop = Arc::new(ReflectionLoop::new(
            test_config(),
            AgentId::random(),
            registry,
            policy,
            self_model,
            oracle,
        ));

        reflection_loop.run_cycle(CancellationToken::new()).await;

        assert_eq!(reflection_loop.cycle_count().await, 0);
        assert!(reflection_loop.last_cycle().await.is_none());
    }

    #[tokio::test]
    async fn rate_limit_skips_cycles_once_budget_is_exhausted() {
        let mut config = test_config();
        config.max_cycles_per_hour = 2;
        config.cycle_interval = Duration::from_millis(1);

        let registry = Arc::new(ObserverRegistry::new());
        let policy = Arc::new(DecisionPolicy::new(3, 7).unwrap());
        let self_model = Arc::new(SelfModel::new());
        let oracle: Arc<dyn Oracle> = Arc::new(StaticOracle::reply("IDLE: nothing to do"));

        let reflection_loop = Arc::new(ReflectionLoop::new(
            config,
            AgentId::random(),
            registry,
            policy,
            self_model,
            oracle,
        ));

        for _ in 0..5 {
            reflection_loop.run_cycle(CancellationToken::new()).await;
        }

        assert_eq!(reflection_loop.cycle_count().await, 2);
    }

    #[tokio::test]
    async fn start_rejects_a_second_concurrent_start() {
        let reflection_loop = test_loop("IDLE: nothing to do");
        let token = CancellationToken::new();

        reflection_loop.start(token.clone()).await.unwrap();
        let err = reflection_loop.start(token.clone()).await.expect_err("already running");
        assert!(matches!(err, LoopError::AlreadyRunning));

        token.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!reflection_loop.is_running().await);
    }

    #[tokio::test]
    async fn unparseable_oracle_reply_degrades_to_reflect() {
        let reflection_loop = test_loop("I'm thinking about it");
        reflection_loop.run_cycle(CancellationToken::new()).await;

        let memory = reflection_loop.memory.clone().unwrap();
        let entries = memory.search("cycle", 10).await.unwrap();
        assert!(entries[0].content().contains("action=Reflect"));
    }
}

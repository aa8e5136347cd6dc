//! Runnable demonstration of the reflection loop wired against a deploy
//! queue and a host-health observer, an in-process oracle, and
//! tracing-backed sinks.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use clap::Parser;
use reflect_config::{DecisionPolicyConfig, ReflectionLoopConfig};
use reflect_core::{AgentId, CapabilityId, ObserverId, Severity, SituationId};
use reflect_loop::ReflectionLoop;
use reflect_memory::{FileJournal, Journal, JournaledMemorySink, VolatileConfig, VolatileMemory};
use reflect_oracle::ollama::{OllamaConfig, OllamaOracle};
use reflect_oracle::static_oracle::StaticOracle;
use reflect_oracle::{Oracle, OracleResponse};
use reflect_policy::DecisionPolicy;
use reflect_registry::{Observation, Observer, ObserverError, ObserverRegistry};
use reflect_selfmodel::{CapabilityDescriptor, SelfModel};
use reflect_sinks::{Action, ActionHandler, TracingEscalationSink};
use tokio::signal::ctrl_c;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Demonstration command-line arguments.
#[derive(Parser, Debug)]
struct Args {
    /// Name this agent identifies itself as in prompts and escalations.
    #[arg(long)]
    name: Option<String>,

    /// Ollama-compatible base URL. When omitted, a canned static oracle
    /// drives the demo instead of a real model.
    #[arg(long)]
    ollama_url: Option<String>,

    /// Model name passed to the Ollama-compatible endpoint.
    #[arg(long, default_value = "gemma3")]
    ollama_model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    reflect_telemetry::init_tracing();

    let args = Args::parse();

    let mut config = ReflectionLoopConfig::from_env().unwrap_or_default();
    if let Some(name) = args.name {
        config.agent_name = name;
    }

    let agent_id = AgentId::random();

    let policy_config = DecisionPolicyConfig::from_env().unwrap_or_default();
    let policy = Arc::new(
        DecisionPolicy::new(policy_config.handle_threshold, policy_config.escalate_threshold)
            .map_err(|err| anyhow!(err.to_string()))?
            .with_min_samples(policy_config.min_samples)
            .with_learning_fail_threshold(policy_config.learning_fail_threshold)
            .with_history_capacity(policy_config.history_capacity),
    );

    let registry = Arc::new(ObserverRegistry::new());
    registry
        .register(Arc::new(DeployQueueObserver::new(
            ObserverId::new("deploy_queue").map_err(|err| anyhow!(err.to_string()))?,
        )))
        .map_err(|err| anyhow!(err.to_string()))?;
    registry
        .register(Arc::new(HostHealthObserver::new(
            ObserverId::new("host_health").map_err(|err| anyhow!(err.to_string()))?,
        )))
        .map_err(|err| anyhow!(err.to_string()))?;

    let self_model = Arc::new(SelfModel::new());
    self_model.register_all([
        CapabilityDescriptor::new(
            CapabilityId::new("deploy.rollback").map_err(|err| anyhow!(err.to_string()))?,
            "Roll a deployment back to the previous known-good revision",
        ),
        CapabilityDescriptor::new(
            CapabilityId::new("host.restart").map_err(|err| anyhow!(err.to_string()))?,
            "Restart an unhealthy host",
        ),
    ]);

    let oracle: Arc<dyn Oracle> = match args.ollama_url {
        Some(base_url) => {
            let ollama_config = OllamaConfig::new(args.ollama_model).with_base_url(base_url);
            Arc::new(OllamaOracle::new(ollama_config).map_err(|err| anyhow!(err.to_string()))?)
        }
        None => Arc::new(StaticOracle::sequence(vec![
            OracleResponse::new("IDLE: queue and hosts look nominal"),
            OracleResponse::new("REFLECT: keep watching the deploy queue"),
            OracleResponse::new("GOAL: drain the deploy queue before it breaches capacity"),
        ])),
    };

    let journal_path =
        std::env::temp_dir().join(format!("reflect-agent-{agent_id}-journal.log"));
    let journal: Arc<dyn Journal> = Arc::new(
        FileJournal::open(&journal_path)
            .await
            .map_err(|err| anyhow!(err.to_string()))?,
    );
    let volatile = Arc::new(VolatileMemory::new(VolatileConfig::default()));
    let memory = Arc::new(JournaledMemorySink::new(volatile, journal));
    info!(journal = %journal_path.display(), "memory journal initialised");

    let reflection_loop = Arc::new(
        ReflectionLoop::new(config, agent_id, registry, policy, self_model, oracle)
            .with_memory(memory)
            .with_escalation_sink(Arc::new(TracingEscalationSink))
            .with_action_handler(Arc::new(LoggingActionHandler)),
    );

    let cancellation = CancellationToken::new();
    reflection_loop
        .start(cancellation.clone())
        .await
        .map_err(|err| anyhow!(err.to_string()))?;

    info!(agent = reflection_loop.agent_name(), "reflection agent running; press Ctrl+C to stop");
    ctrl_c().await?;

    cancellation.cancel();
    Ok(())
}

/// Simulates a deploy queue whose depth grows by one on every check,
/// escalating once it is long enough to risk a capacity breach.
struct DeployQueueObserver {
    id: ObserverId,
    depth: AtomicU32,
}

impl DeployQueueObserver {
    fn new(id: ObserverId) -> Self {
        Self {
            id,
            depth: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl Observer for DeployQueueObserver {
    fn id(&self) -> &ObserverId {
        &self.id
    }

    async fn check(
        &self,
        _cancellation: CancellationToken,
    ) -> (Vec<Observation>, Option<ObserverError>) {
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        let severity = Severity::new(depth.min(10) as u8).unwrap_or_else(|_| Severity::critical());
        let situation_id = match SituationId::new("deploy_queue_depth") {
            Ok(id) => id,
            Err(err) => {
                return (
                    Vec::new(),
                    Some(ObserverError::new(self.id.clone(), err.to_string())),
                );
            }
        };
        let observation = Observation::new(
            self.id.clone(),
            situation_id,
            severity,
            format!("deploy queue depth is {depth}"),
        )
        .with_detail("depth", depth.to_string());
        (vec![observation], None)
    }
}

/// Simulates a host-health probe that always reports nominal, demonstrating
/// an observer that rarely produces escalation-worthy observations.
struct HostHealthObserver {
    id: ObserverId,
}

impl HostHealthObserver {
    fn new(id: ObserverId) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Observer for HostHealthObserver {
    fn id(&self) -> &ObserverId {
        &self.id
    }

    async fn check(
        &self,
        _cancellation: CancellationToken,
    ) -> (Vec<Observation>, Option<ObserverError>) {
        let situation_id = match SituationId::new("host_health") {
            Ok(id) => id,
            Err(err) => {
                return (
                    Vec::new(),
                    Some(ObserverError::new(self.id.clone(), err.to_string())),
                );
            }
        };
        let observation = Observation::new(
            self.id.clone(),
            situation_id,
            Severity::info(),
            "all hosts reporting healthy",
        );
        (vec![observation], None)
    }
}

/// Logs every non-idle action the loop hands off instead of executing it.
struct LoggingActionHandler;

#[async_trait]
impl ActionHandler for LoggingActionHandler {
    async fn handle(&self, _cancellation: CancellationToken, action: Action) {
        info!(kind = ?action.kind(), payload = action.payload(), "action handler invoked");
    }
}

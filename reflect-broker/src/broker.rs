//! The just-in-time permission broker.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use reflect_core::{AgentId, CapabilityId, GrantId, TaskId};
use reflect_sinks::{AuditRecord, AuditSink, TracingAuditSink};

use crate::error::{BrokerError, BrokerResult};
use crate::grant::{Grant, PolicyLevel};

/// Issues, checks, lists, revokes, and reaps time-bounded capability grants,
/// and hosts the static policy-level table.
pub struct PermissionBroker {
    grants: Mutex<HashMap<GrantId, Grant>>,
    policy_levels: Mutex<HashMap<CapabilityId, PolicyLevel>>,
    initial_policy_levels: HashMap<CapabilityId, PolicyLevel>,
    default_level: PolicyLevel,
    audit: Arc<dyn AuditSink>,
}

impl PermissionBroker {
    /// Creates a broker seeded with the given policy-level table and default
    /// level, using the tracing-backed default audit sink.
    #[must_use]
    pub fn new(
        initial_policy_levels: HashMap<CapabilityId, PolicyLevel>,
        default_level: PolicyLevel,
    ) -> Self {
        Self::with_audit_sink(
            initial_policy_levels,
            default_level,
            Arc::new(TracingAuditSink),
        )
    }

    /// Creates a broker with an explicit audit sink.
    #[must_use]
    pub fn with_audit_sink(
        initial_policy_levels: HashMap<CapabilityId, PolicyLevel>,
        default_level: PolicyLevel,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            grants: Mutex::new(HashMap::new()),
            policy_levels: Mutex::new(initial_policy_levels.clone()),
            initial_policy_levels,
            default_level,
            audit,
        }
    }

    /// Issues a grant. Always succeeds; a non-positive `ttl` produces a
    /// grant that is already expired, which is useful for tests that want to
    /// exercise the expired path deterministically.
    ///
    /// # Panics
    ///
    /// Panics if the internal grant map lock has been poisoned.
    pub async fn issue(
        &self,
        capability: CapabilityId,
        to: AgentId,
        by: AgentId,
        task_id: TaskId,
        ttl: Duration,
    ) -> Grant {
        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());
        let policy_level = self.policy_level(&capability);

        let grant = Grant::new(
            capability.clone(),
            policy_level,
            to,
            by,
            task_id.clone(),
            now,
            expires_at,
        );

        {
            let mut guard = self.grants.lock().expect("broker grants poisoned");
            guard.insert(grant.id(), grant.clone());
        }

        let result = if grant.is_valid_at(Utc::now()) {
            "granted"
        } else {
            "granted-expired"
        };
        self.emit_audit(
            by.to_string(),
            "grant.issue",
            capability.as_str(),
            result,
            task_id.as_str(),
        )
        .await;

        grant
    }

    /// Returns `true` iff any grant exists with matching `capability` and
    /// `task_id` where `now < expires_at`. Never extends or refreshes the
    /// underlying grant.
    ///
    /// # Panics
    ///
    /// Panics if the internal grant map lock has been poisoned.
    #[must_use]
    pub fn check(&self, capability: &CapabilityId, task_id: &TaskId) -> bool {
        let now = Utc::now();
        let guard = self.grants.lock().expect("broker grants poisoned");
        guard
            .values()
            .any(|grant| grant.capability() == capability && grant.task_id() == task_id && grant.is_valid_at(now))
    }

    /// Revokes a grant by id.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::GrantNotFound`] if no grant exists with that id.
    ///
    /// # Panics
    ///
    /// Panics if the internal grant map lock has been poisoned.
    pub async fn revoke(&self, id: GrantId) -> BrokerResult<()> {
        let removed = {
            let mut guard = self.grants.lock().expect("broker grants poisoned");
            guard.remove(&id)
        };

        match removed {
            Some(grant) => {
                self.emit_audit(
                    grant.granted_by().to_string(),
                    "grant.revoke",
                    grant.capability().as_str(),
                    "revoked",
                    grant.task_id().as_str(),
                )
                .await;
                Ok(())
            }
            None => Err(BrokerError::GrantNotFound(id)),
        }
    }

    /// Returns defensive copies of every grant scoped to `task_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal grant map lock has been poisoned.
    #[must_use]
    pub fn list(&self, task_id: &TaskId) -> Vec<Grant> {
        let guard = self.grants.lock().expect("broker grants poisoned");
        guard
            .values()
            .filter(|grant| grant.task_id() == task_id)
            .cloned()
            .collect()
    }

    /// Returns defensive copies of every grant.
    ///
    /// # Panics
    ///
    /// Panics if the internal grant map lock has been poisoned.
    #[must_use]
    pub fn list_all(&self) -> Vec<Grant> {
        let guard = self.grants.lock().expect("broker grants poisoned");
        guard.values().cloned().collect()
    }

    /// Removes all grants with `expires_at <= now`. A no-op when none have
    /// expired. Returns the number of grants removed.
    ///
    /// # Panics
    ///
    /// Panics if the internal grant map lock has been poisoned.
    pub fn reap(&self) -> usize {
        let now = Utc::now();
        let mut guard = self.grants.lock().expect("broker grants poisoned");
        let before = guard.len();
        guard.retain(|_, grant| grant.expires_at() > now);
        before - guard.len()
    }

    /// Returns the number of grants currently stored, expired or not.
    ///
    /// # Panics
    ///
    /// Panics if the internal grant map lock has been poisoned.
    #[must_use]
    pub fn count(&self) -> usize {
        self.grants.lock().expect("broker grants poisoned").len()
    }

    /// Sets the policy level for a capability.
    ///
    /// # Panics
    ///
    /// Panics if the internal policy-level map lock has been poisoned.
    pub async fn set_policy_level(&self, capability: CapabilityId, level: PolicyLevel) {
        {
            let mut guard = self
                .policy_levels
                .lock()
                .expect("broker policy levels poisoned");
            guard.insert(capability.clone(), level);
        }
        self.emit_audit(
            "system".to_owned(),
            "policy_level.set",
            capability.as_str(),
            policy_level_label(level),
            "",
        )
        .await;
    }

    /// Returns the policy level for `capability`, falling back to the
    /// broker-wide default when the capability has no explicit entry.
    ///
    /// # Panics
    ///
    /// Panics if the internal policy-level map lock has been poisoned.
    #[must_use]
    pub fn policy_level(&self, capability: &CapabilityId) -> PolicyLevel {
        self.policy_levels
            .lock()
            .expect("broker policy levels poisoned")
            .get(capability)
            .copied()
            .unwrap_or(self.default_level)
    }

    /// Restores the policy-level table to the values the broker was
    /// constructed with, discarding any runtime changes.
    ///
    /// # Panics
    ///
    /// Panics if the internal policy-level map lock has been poisoned.
    pub async fn reset_policy_levels(&self) {
        {
            let mut guard = self
                .policy_levels
                .lock()
                .expect("broker policy levels poisoned");
            *guard = self.initial_policy_levels.clone();
        }
        self.emit_audit("system".to_owned(), "policy_level.reset", "*", "reset", "")
            .await;
    }

    async fn emit_audit(&self, user_id: String, action: &str, resource: &str, result: &str, task_id: &str) {
        let mut record = AuditRecord::new(user_id, action, resource, result);
        if !task_id.is_empty() {
            record = record.with_detail("task_id", task_id);
        }
        if let Err(err) = self.audit.record(record).await {
            tracing::warn!(error = %err, "audit sink failed to record broker event");
        }
    }
}

fn policy_level_label(level: PolicyLevel) -> &'static str {
    match level {
        PolicyLevel::AutoApprove => "auto-approve",
        PolicyLevel::NotifyThenDo => "notify-then-do",
        PolicyLevel::RequireApproval => "require-approval",
        PolicyLevel::AlwaysDeny => "always-deny",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (CapabilityId, AgentId, AgentId, TaskId) {
        (
            CapabilityId::new("deploy").unwrap(),
            AgentId::random(),
            AgentId::random(),
            TaskId::new("task-1").unwrap(),
        )
    }

    #[tokio::test]
    async fn issue_then_check_is_true_for_positive_ttl() {
        let broker = PermissionBroker::new(HashMap::new(), PolicyLevel::AutoApprove);
        let (capability, to, by, task_id) = ids();

        broker
            .issue(capability.clone(), to, by, task_id.clone(), Duration::from_secs(60))
            .await;

        assert!(broker.check(&capability, &task_id));
    }

    #[tokio::test]
    async fn zero_ttl_grant_is_expired_immediately() {
        let broker = PermissionBroker::new(HashMap::new(), PolicyLevel::AutoApprove);
        let (capability, to, by, task_id) = ids();

        broker
            .issue(capability.clone(), to, by, task_id.clone(), Duration::ZERO)
            .await;

        assert!(!broker.check(&capability, &task_id));
    }

    #[tokio::test]
    async fn revoke_then_check_is_false() {
        let broker = PermissionBroker::new(HashMap::new(), PolicyLevel::AutoApprove);
        let (capability, to, by, task_id) = ids();

        let grant = broker
            .issue(capability.clone(), to, by, task_id.clone(), Duration::from_secs(60))
            .await;
        broker.revoke(grant.id()).await.unwrap();

        assert!(!broker.check(&capability, &task_id));
    }

    #[tokio::test]
    async fn revoke_unknown_grant_errors() {
        let broker = PermissionBroker::new(HashMap::new(), PolicyLevel::AutoApprove);
        let err = broker
            .revoke(GrantId::random())
            .await
            .expect_err("unknown grant should error");
        assert!(matches!(err, BrokerError::GrantNotFound(_)));
    }

    #[tokio::test]
    async fn reap_removes_only_expired_grants() {
        let broker = PermissionBroker::new(HashMap::new(), PolicyLevel::AutoApprove);
        let (capability, to, by, task_id) = ids();

        broker
            .issue(capability.clone(), to, by, task_id.clone(), Duration::ZERO)
            .await;
        broker
            .issue(capability, to, by, task_id, Duration::from_secs(60))
            .await;

        assert_eq!(broker.reap(), 1);
        assert_eq!(broker.count(), 1);
        assert_eq!(broker.reap(), 0);
    }

    #[tokio::test]
    async fn reset_policy_levels_restores_initial_table() {
        let mut initial = HashMap::new();
        initial.insert(CapabilityId::new("deploy").unwrap(), PolicyLevel::RequireApproval);
        let broker = PermissionBroker::new(initial, PolicyLevel::AlwaysDeny);

        let capability = CapabilityId::new("deploy").unwrap();
        broker
            .set_policy_level(capability.clone(), PolicyLevel::AutoApprove)
            .await;
        assert_eq!(broker.policy_level(&capability), PolicyLevel::AutoApprove);

        broker.reset_policy_levels().await;
        assert_eq!(broker.policy_level(&capability), PolicyLevel::RequireApproval);
    }

    #[tokio::test]
    async fn policy_level_falls_back_to_default() {
        let broker = PermissionBroker::new(HashMap::new(), PolicyLevel::RequireApproval);
        let capability = CapabilityId::new("undeclared").unwrap();
        assert_eq!(broker.policy_level(&capability), PolicyLevel::RequireApproval);
    }
}

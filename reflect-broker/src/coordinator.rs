//! Combines a task's required capabilities with the broker's policy-level
//! table to compute a single just-in-time grant request's outcome.

use std::collections::BTreeSet;
use std::time::Duration;

use reflect_core::{AgentId, CapabilityId, TaskId};

use crate::broker::PermissionBroker;
use crate::grant::PolicyLevel;

/// One request for a task to exercise a set of capabilities.
#[derive(Debug, Clone)]
pub struct JitGrantRequest {
    /// The capabilities the task requires.
    pub capabilities: Vec<CapabilityId>,
    /// The agent the grants, if issued, would be made out to.
    pub to: AgentId,
    /// The agent or subsystem requesting the grants.
    pub by: AgentId,
    /// The task the grants would be scoped to.
    pub task_id: TaskId,
    /// How long an auto-approved grant should live.
    pub ttl: Duration,
}

/// The outcome of evaluating a [`JitGrantRequest`] against the policy-level
/// table: three disjoint capability sets.
#[derive(Debug, Clone, Default)]
pub struct JitGrantResult {
    /// Capabilities that were immediately issued (auto-approve, or an
    /// existing valid grant already covered them).
    pub granted: BTreeSet<CapabilityId>,
    /// Capabilities awaiting a human decision (require-approval or
    /// notify-then-do).
    pub pending: BTreeSet<CapabilityId>,
    /// Capabilities that may never be granted (always-deny).
    pub denied: BTreeSet<CapabilityId>,
}

impl JitGrantResult {
    /// `true` iff every requested capability ended up granted, i.e.
    /// `pending` and `denied` are both empty.
    #[must_use]
    pub fn all_granted(&self) -> bool {
        self.pending.is_empty() && self.denied.is_empty()
    }
}

/// Evaluates JIT grant requests against a [`PermissionBroker`]'s policy-level
/// table, issuing auto-approved grants and leaving the rest for a human.
pub struct JitGrantCoordinator {
    broker: PermissionBroker,
}

impl JitGrantCoordinator {
    /// Wraps a broker with the JIT request orchestrator.
    #[must_use]
    pub fn new(broker: PermissionBroker) -> Self {
        Self { broker }
    }

    /// Returns the underlying broker.
    #[must_use]
    pub fn broker(&self) -> &PermissionBroker {
        &self.broker
    }

    /// Evaluates one request. An existing valid grant for `(capability,
    /// task_id)` short-circuits that capability straight to `granted` without
    /// re-issuing; otherwise the capability's policy level decides its fate.
    pub async fn request(&self, request: JitGrantRequest) -> JitGrantResult {
        let mut outcome = JitGrantResult::default();

        for capability in request.capabilities {
            if self.broker.check(&capability, &request.task_id) {
                outcome.granted.insert(capability);
                continue;
            }

            match self.broker.policy_level(&capability) {
                PolicyLevel::AutoApprove => {
                    self.broker
                        .issue(
                            capability.clone(),
                            request.to,
                            request.by,
                            request.task_id.clone(),
                            request.ttl,
                        )
                        .await;
                    outcome.granted.insert(capability);
                }
                PolicyLevel::NotifyThenDo | PolicyLevel::RequireApproval => {
                    outcome.pending.insert(capability);
                }
                PolicyLevel::AlwaysDeny => {
                    outcome.denied.insert(capability);
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ids() -> (AgentId, AgentId, TaskId) {
        (AgentId::random(), AgentId::random(), TaskId::new("task-1").unwrap())
    }

    #[tokio::test]
    async fn splits_capabilities_by_policy_level() {
        let mut levels = HashMap::new();
        levels.insert(CapabilityId::new("read").unwrap(), PolicyLevel::AutoApprove);
        levels.insert(CapabilityId::new("write").unwrap(), PolicyLevel::RequireApproval);
        let broker = PermissionBroker::new(levels, PolicyLevel::AlwaysDeny);
        let coordinator = JitGrantCoordinator::new(broker);

        let (to, by, task_id) = ids();
        let result = coordinator
            .request(JitGrantRequest {
                capabilities: vec![CapabilityId::new("read").unwrap(), CapabilityId::new("write").unwrap()],
                to,
                by,
                task_id: task_id.clone(),
                ttl: Duration::from_secs(60),
            })
            .await;

        assert_eq!(result.granted, BTreeSet::from([CapabilityId::new("read").unwrap()]));
        assert_eq!(result.pending, BTreeSet::from([CapabilityId::new("write").unwrap()]));
        assert!(result.denied.is_empty());
        assert!(!result.all_granted());

        assert!(coordinator.broker().check(&CapabilityId::new("read").unwrap(), &task_id));
        assert!(!coordinator.broker().check(&CapabilityId::new("write").unwrap(), &task_id));
    }

    #[tokio::test]
    async fn existing_grant_short_circuits_to_granted() {
        let broker = PermissionBroker::new(HashMap::new(), PolicyLevel::RequireApproval);
        let capability = CapabilityId::new("deploy").unwrap();
        let (to, by, task_id) = ids();
        broker
            .issue(capability.clone(), to, by, task_id.clone(), Duration::from_secs(60))
            .await;
        let before = broker.count();

        let coordinator = JitGrantCoordinator::new(broker);
        let result = coordinator
            .request(JitGrantRequest {
                capabilities: vec![capability.clone()],
                to,
                by,
                task_id,
                ttl: Duration::from_secs(60),
            })
            .await;

        assert!(result.granted.contains(&capability));
        assert_eq!(coordinator.broker().count(), before);
    }

    #[tokio::test]
    async fn always_deny_never_grants() {
        let mut levels = HashMap::new();
        levels.insert(CapabilityId::new("danger").unwrap(), PolicyLevel::AlwaysDeny);
        let broker = PermissionBroker::new(levels, PolicyLevel::AutoApprove);
        let coordinator = JitGrantCoordinator::new(broker);

        let (to, by, task_id) = ids();
        let result = coordinator
            .request(JitGrantRequest {
                capabilities: vec![CapabilityId::new("danger").unwrap()],
                to,
                by,
                task_id,
                ttl: Duration::from_secs(60),
            })
            .await;

        assert!(result.denied.contains(&CapabilityId::new("danger").unwrap()));
        assert!(!result.all_granted());
    }
}

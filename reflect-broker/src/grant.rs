//! Capability grants and the static policy-level disposition.

use chrono::{DateTime, Utc};
use reflect_core::{AgentId, CapabilityId, GrantId, TaskId};
use serde::{Deserialize, Serialize};

/// The static disposition of a capability, independent of any grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyLevel {
    /// Grants are issued immediately without human involvement.
    AutoApprove,
    /// The action proceeds, but a human is notified after the fact.
    NotifyThenDo,
    /// A human must approve before a grant is issued.
    RequireApproval,
    /// The capability may never be granted.
    AlwaysDeny,
}

/// A time-bounded authorization to exercise one capability against one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    id: GrantId,
    capability: CapabilityId,
    policy_level: PolicyLevel,
    granted_to: AgentId,
    granted_by: AgentId,
    task_id: TaskId,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Grant {
    pub(crate) fn new(
        capability: CapabilityId,
        policy_level: PolicyLevel,
        granted_to: AgentId,
        granted_by: AgentId,
        task_id: TaskId,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: GrantId::random(),
            capability,
            policy_level,
            granted_to,
            granted_by,
            task_id,
            created_at,
            expires_at,
        }
    }

    /// Returns the grant's unique identifier.
    #[must_use]
    pub const fn id(&self) -> GrantId {
        self.id
    }

    /// Returns the capability this grant authorizes.
    #[must_use]
    pub fn capability(&self) -> &CapabilityId {
        &self.capability
    }

    /// Returns the policy level in effect when the grant was issued.
    #[must_use]
    pub const fn policy_level(&self) -> PolicyLevel {
        self.policy_level
    }

    /// Returns the agent this grant was issued to.
    #[must_use]
    pub const fn granted_to(&self) -> AgentId {
        self.granted_to
    }

    /// Returns the agent or actor that issued the grant.
    #[must_use]
    pub const fn granted_by(&self) -> AgentId {
        self.granted_by
    }

    /// Returns the task this grant is scoped to.
    #[must_use]
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Returns when the grant was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the grant expires.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` iff `now < expires_at`. Does not consult any `status`
    /// field; validity is computed purely from the expiry timestamp, so an
    /// expired grant is never reported valid even before it is reaped.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

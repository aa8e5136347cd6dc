//! Identifier types shared across the reflection runtime.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

const MAX_LABEL_LEN: usize = 128;

/// Unique identifier for the agent process running the reflection loop.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(Uuid);

impl AgentId {
    /// Generates a random agent identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::random()
    }
}

impl Display for AgentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for AgentId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<AgentId> for Uuid {
    fn from(value: AgentId) -> Self {
        value.0
    }
}

impl FromStr for AgentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::parse_str(s).map_err(Error::from)?;
        Ok(Self::from_uuid(uuid))
    }
}

/// Unique identifier for an issued capability grant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantId(Uuid);

impl GrantId {
    /// Generates a random grant identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for GrantId {
    fn default() -> Self {
        Self::random()
    }
}

impl Display for GrantId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

macro_rules! label_id {
    ($(#[$meta:meta])* $name:ident, $variant:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier after validating its format.
            ///
            /// # Errors
            ///
            /// Returns an error if the supplied label is empty, exceeds the
            /// maximum supported length, or is whitespace-only.
            pub fn new(label: impl Into<String>) -> crate::Result<Self> {
                let label = label.into();
                validate_label(&label).map_err(|reason| Error::$variant {
                    label: label.clone(),
                    reason,
                })?;
                Ok(Self(label))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

label_id!(
    /// Identifier for a registered observer, unique within a single registry.
    ObserverId,
    InvalidObserverId
);
label_id!(
    /// Identifier for a normalized situation, used as the policy's evaluation key.
    SituationId,
    InvalidSituationId
);
label_id!(
    /// Identifier for the task a permission grant or observation is scoped to.
    TaskId,
    InvalidTaskId
);
label_id!(
    /// Identifier for a capability an agent may be granted or may advertise.
    CapabilityId,
    InvalidCapabilityId
);

fn validate_label(label: &str) -> Result<(), &'static str> {
    if label.trim().is_empty() {
        return Err("identifier must not be empty or whitespace-only");
    }
    if label.len() > MAX_LABEL_LEN {
        return Err("identifier exceeds maximum length");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_agent_id() {
        let id = AgentId::random();
        let parsed = id.to_string().parse::<AgentId>().expect("parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn grant_ids_are_unique() {
        assert_ne!(GrantId::random(), GrantId::random());
    }

    #[test]
    fn label_ids_reject_empty() {
        let err = ObserverId::new("   ").expect_err("blank label should fail");
        assert!(matches!(err, Error::InvalidObserverId { .. }));
    }

    #[test]
    fn label_ids_accept_reasonable_values() {
        let id = SituationId::new("ci_slow").unwrap();
        assert_eq!(id.as_str(), "ci_slow");
        assert_eq!(String::from(id), "ci_slow".to_owned());
    }
}

//! Capability descriptors held by the self model.

use chrono::{DateTime, Utc};
use reflect_core::CapabilityId;

/// Describes one capability the agent advertises to its own reflection
/// prompt: what it is, whether it is currently usable, and how often it has
/// been exercised.
#[derive(Debug, Clone)]
pub struct CapabilityDescriptor {
    id: CapabilityId,
    description: String,
    available: bool,
    limitations: Vec<String>,
    last_used: Option<DateTime<Utc>>,
    use_count: u64,
}

impl CapabilityDescriptor {
    /// Creates a descriptor, available by default.
    #[must_use]
    pub fn new(id: CapabilityId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            available: true,
            limitations: Vec::new(),
            last_used: None,
            use_count: 0,
        }
    }

    /// Attaches a known limitation and returns the updated descriptor.
    #[must_use]
    pub fn with_limitation(mut self, limitation: impl Into<String>) -> Self {
        self.limitations.push(limitation.into());
        self
    }

    /// Marks the capability unavailable from construction.
    #[must_use]
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Returns the capability identifier.
    #[must_use]
    pub fn id(&self) -> &CapabilityId {
        &self.id
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns whether the capability is currently usable.
    #[must_use]
    pub const fn available(&self) -> bool {
        self.available
    }

    /// Returns the capability's known limitations.
    #[must_use]
    pub fn limitations(&self) -> &[String] {
        &self.limitations
    }

    /// Returns when the capability was last exercised, if ever.
    #[must_use]
    pub const fn last_used(&self) -> Option<DateTime<Utc>> {
        self.last_used
    }

    /// Returns how many times the capability has been exercised.
    #[must_use]
    pub const fn use_count(&self) -> u64 {
        self.use_count
    }

    pub(crate) fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub(crate) fn record_use(&mut self) {
        self.use_count += 1;
        self.last_used = Some(Utc::now());
    }
}

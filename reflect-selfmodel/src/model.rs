//! The self model: a read-many, write-rare capability catalog plus the
//! active-task counter that feeds [`LoadSnapshot`].

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use reflect_core::CapabilityId;

use crate::descriptor::CapabilityDescriptor;
use crate::error::{SelfModelError, SelfModelResult};
use crate::load::{LoadSnapshot, read_allocated_bytes, read_live_task_count};

struct Inner {
    capabilities: HashMap<CapabilityId, CapabilityDescriptor>,
    active_tasks: u32,
}

/// Read-many registry of capability descriptors plus a live load snapshot
/// used to form the reflection prompt and cap concurrent work.
#[derive(Default)]
pub struct SelfModel {
    inner: RwLock<Inner>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            capabilities: HashMap::new(),
            active_tasks: 0,
        }
    }
}

impl SelfModel {
    /// Creates an empty self model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a capability, replacing any prior descriptor with the same
    /// id.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock has been poisoned.
    pub fn register(&self, descriptor: CapabilityDescriptor) {
        let mut guard = self.inner.write().expect("self model poisoned");
        guard.capabilities.insert(descriptor.id().clone(), descriptor);
    }

    /// Registers every descriptor in `descriptors`.
    pub fn register_all<I>(&self, descriptors: I)
    where
        I: IntoIterator<Item = CapabilityDescriptor>,
    {
        for descriptor in descriptors {
            self.register(descriptor);
        }
    }

    /// Returns `true` iff `id` is registered and currently available.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock has been poisoned.
    #[must_use]
    pub fn can_do(&self, id: &CapabilityId) -> bool {
        self.inner
            .read()
            .expect("self model poisoned")
            .capabilities
            .get(id)
            .is_some_and(CapabilityDescriptor::available)
    }

    /// Returns a defensive copy of the descriptor registered under `id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock has been poisoned.
    #[must_use]
    pub fn get(&self, id: &CapabilityId) -> Option<CapabilityDescriptor> {
        self.inner.read().expect("self model poisoned").capabilities.get(id).cloned()
    }

    /// Marks a registered capability available or unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`SelfModelError::UnknownCapability`] if `id` was never
    /// registered.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock has been poisoned.
    pub fn set_available(&self, id: &CapabilityId, available: bool) -> SelfModelResult<()> {
        let mut guard = self.inner.write().expect("self model poisoned");
        let descriptor = guard
            .capabilities
            .get_mut(id)
            .ok_or_else(|| SelfModelError::UnknownCapability(id.clone()))?;
        descriptor.set_available(available);
        Ok(())
    }

    /// Increments a capability's use counter and stamps its last-used time.
    ///
    /// # Errors
    ///
    /// Returns [`SelfModelError::UnknownCapability`] if `id` was never
    /// registered.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock has been poisoned.
    pub fn record_use(&self, id: &CapabilityId) -> SelfModelResult<()> {
        let mut guard = self.inner.write().expect("self model poisoned");
        let descriptor = guard
            .capabilities
            .get_mut(id)
            .ok_or_else(|| SelfModelError::UnknownCapability(id.clone()))?;
        descriptor.record_use();
        Ok(())
    }

    /// Returns a defensive snapshot of every registered descriptor.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock has been poisoned.
    #[must_use]
    pub fn list(&self) -> Vec<CapabilityDescriptor> {
        self.inner.read().expect("self model poisoned").capabilities.values().cloned().collect()
    }

    /// Returns the ids of every currently available capability.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock has been poisoned.
    #[must_use]
    pub fn available_capabilities(&self) -> Vec<CapabilityId> {
        self.inner
            .read()
            .expect("self model poisoned")
            .capabilities
            .values()
            .filter(|descriptor| descriptor.available())
            .map(|descriptor| descriptor.id().clone())
            .collect()
    }

    /// Increments the active-task counter.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock has been poisoned.
    pub fn increment_active(&self) {
        let mut guard = self.inner.write().expect("self model poisoned");
        guard.active_tasks += 1;
    }

    /// Decrements the active-task counter, saturating at zero.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock has been poisoned.
    pub fn decrement_active(&self) {
        let mut guard = self.inner.write().expect("self model poisoned");
        guard.active_tasks = guard.active_tasks.saturating_sub(1);
    }

    /// Returns `true` if the agent can take on more work: `max <= 0` means
    /// unlimited.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock has been poisoned.
    #[must_use]
    pub fn can_handle_more(&self, max: i64) -> bool {
        if max <= 0 {
            return true;
        }
        let active = self.inner.read().expect("self model poisoned").active_tasks;
        i64::from(active) < max
    }

    /// Takes a live load snapshot. The active-task count is read under the
    /// lock; the runtime and OS counters are read outside it to avoid
    /// contending with capability readers.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock has been poisoned.
    #[must_use]
    pub fn load(&self) -> LoadSnapshot {
        let active_tasks = self.inner.read().expect("self model poisoned").active_tasks;
        LoadSnapshot {
            active_tasks,
            live_task_count: read_live_task_count(),
            allocated_bytes: read_allocated_bytes(),
            taken_at: Utc::now(),
        }
    }

    /// Renders a one-line summary of the catalog: how many capabilities are
    /// registered and how many are currently available.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock has been poisoned.
    #[must_use]
    pub fn summary(&self) -> String {
        let guard = self.inner.read().expect("self model poisoned");
        let total = guard.capabilities.len();
        let available = guard.capabilities.values().filter(|d| d.available()).count();
        format!("{available}/{total} capabilities available, {} active tasks", guard.active_tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(id: &str) -> CapabilityDescriptor {
        CapabilityDescriptor::new(CapabilityId::new(id).unwrap(), format!("does {id}"))
    }

    #[test]
    fn can_do_requires_registration_and_availability() {
        let model = SelfModel::new();
        let id = CapabilityId::new("deploy").unwrap();
        assert!(!model.can_do(&id));

        model.register(cap("deploy"));
        assert!(model.can_do(&id));

        model.set_available(&id, false).unwrap();
        assert!(!model.can_do(&id));
    }

    #[test]
    fn set_available_on_unknown_capability_errors() {
        let model = SelfModel::new();
        let err = model
            .set_available(&CapabilityId::new("ghost").unwrap(), false)
            .expect_err("unknown capability");
        assert!(matches!(err, SelfModelError::UnknownCapability(_)));
    }

    #[test]
    fn record_use_increments_counter_and_stamps_time() {
        let model = SelfModel::new();
        model.register(cap("deploy"));
        let id = CapabilityId::new("deploy").unwrap();

        model.record_use(&id).unwrap();
        model.record_use(&id).unwrap();

        let descriptor = model.get(&id).unwrap();
        assert_eq!(descriptor.use_count(), 2);
        assert!(descriptor.last_used().is_some());
    }

    #[test]
    fn active_task_counter_saturates_at_zero() {
        let model = SelfModel::new();
        model.decrement_active();
        assert!(model.can_handle_more(1));
        model.increment_active();
        assert!(!model.can_handle_more(1));
        model.decrement_active();
        model.decrement_active();
        assert!(model.can_handle_more(1));
    }

    #[test]
    fn can_handle_more_is_unlimited_for_non_positive_max() {
        let model = SelfModel::new();
        for _ in 0..5 {
            model.increment_active();
        }
        assert!(model.can_handle_more(0));
        assert!(model.can_handle_more(-1));
    }

    #[test]
    fn available_capabilities_excludes_disabled() {
        let model = SelfModel::new();
        model.register(cap("a"));
        model.register(cap("b"));
        model.set_available(&CapabilityId::new("b").unwrap(), false).unwrap();

        let available = model.available_capabilities();
        assert_eq!(available, vec![CapabilityId::new("a").unwrap()]);
    }
}

//! The concurrent observer registry and its fan-out execution.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use reflect_core::ObserverId;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{AggregateError, ObserverError, RegistryError, RegistryResult};
use crate::observation::Observation;
use crate::observer::Observer;

/// Holds named observers and runs them concurrently per tick.
///
/// The write lock for `register`/`unregister` is never held while observers
/// run: `check_all` takes a snapshot of the current observer set up front and
/// releases the read lock before spawning any work.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: RwLock<HashMap<ObserverId, Arc<dyn Observer>>>,
}

impl ObserverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers an observer under its own id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if an observer with the same id
    /// is already registered.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock has been poisoned.
    pub fn register(&self, observer: Arc<dyn Observer>) -> RegistryResult<()> {
        let id = observer.id().clone();
        let mut guard = self.observers.write().expect("observer registry poisoned");
        if guard.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        guard.insert(id, observer);
        Ok(())
    }

    /// Removes an observer by id. Idempotent: removing an unknown id is not
    /// an error.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock has been poisoned.
    pub fn unregister(&self, id: &ObserverId) {
        let mut guard = self.observers.write().expect("observer registry poisoned");
        guard.remove(id);
    }

    /// Returns the observer registered under `id`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock has been poisoned.
    #[must_use]
    pub fn get(&self, id: &ObserverId) -> Option<Arc<dyn Observer>> {
        let guard = self.observers.read().expect("observer registry poisoned");
        guard.get(id).cloned()
    }

    /// Returns a snapshot of all registered observers, order undefined.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock has been poisoned.
    #[must_use]
    pub fn list(&self) -> Vec<Arc<dyn Observer>> {
        let guard = self.observers.read().expect("observer registry poisoned");
        guard.values().cloned().collect()
    }

    /// Returns the number of registered observers.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock has been poisoned.
    #[must_use]
    pub fn count(&self) -> usize {
        self.observers
            .read()
            .expect("observer registry poisoned")
            .len()
    }

    /// Runs every registered observer concurrently under `cancellation`,
    /// waits for all to complete, and returns the concatenation of every
    /// observer's observations alongside an aggregate of any per-observer
    /// failures. An empty registry returns an empty list and no error.
    pub async fn check_all(
        &self,
        cancellation: CancellationToken,
    ) -> (Vec<Observation>, Option<AggregateError>) {
        let snapshot = self.list();

        let mut handles = Vec::with_capacity(snapshot.len());
        for observer in snapshot {
            let id = observer.id().clone();
            let token = cancellation.clone();
            let handle = tokio::spawn(async move { observer.check(token).await });
            handles.push((id, handle));
        }

        let mut observations = Vec::new();
        let mut failures = Vec::new();

        for (id, handle) in handles {
            match handle.await {
                Ok((obs, err)) => {
                    observations.extend(obs);
                    if let Some(err) = err {
                        warn!(observer = %id, reason = %err, "observer reported a failure");
                        failures.push(err);
                    }
                }
                Err(join_err) => {
                    warn!(observer = %id, error = %join_err, "observer task did not complete");
                    failures.push(ObserverError::new(id, format!("task failure: {join_err}")));
                }
            }
        }

        (observations, AggregateError::from_failures(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Observation;
    use async_trait::async_trait;
    use reflect_core::{Severity, SituationId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver {
        id: ObserverId,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Observer for CountingObserver {
        fn id(&self) -> &ObserverId {
            &self.id
        }

        async fn check(
            &self,
            _cancellation: CancellationToken,
        ) -> (Vec<Observation>, Option<ObserverError>) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return (
                    Vec::new(),
                    Some(ObserverError::new(self.id.clone(), "boom")),
                );
            }
            let observation = Observation::new(
                self.id.clone(),
                SituationId::new("ci_slow").unwrap(),
                Severity::warning(),
                "slow build",
            );
            (vec![observation], None)
        }
    }

    #[test]
    fn register_rejects_duplicate_ids() {
        let registry = ObserverRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let id = ObserverId::new("ci-poller").unwrap();
        let observer: Arc<dyn Observer> = Arc::new(CountingObserver {
            id: id.clone(),
            calls: calls.clone(),
            fail: false,
        });

        registry.register(observer.clone()).unwrap();
        let err = registry.register(observer).expect_err("duplicate id");
        assert!(matches!(err, RegistryError::DuplicateId(dup) if dup == id));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn unregister_is_idempotent() {
        let registry = ObserverRegistry::new();
        let id = ObserverId::new("ghost").unwrap();
        registry.unregister(&id);
        registry.unregister(&id);
        assert_eq!(registry.count(), 0);
    }

    #[tokio::test]
    async fn check_all_on_empty_registry_returns_no_error() {
        let registry = ObserverRegistry::new();
        let (observations, error) = registry.check_all(CancellationToken::new()).await;
        assert!(observations.is_empty());
        assert!(error.is_none());
    }

    #[tokio::test]
    async fn check_all_aggregates_partial_failures() {
        let registry = ObserverRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        registry
            .register(Arc::new(CountingObserver {
                id: ObserverId::new("ok").unwrap(),
                calls: calls.clone(),
                fail: false,
            }))
            .unwrap();
        registry
            .register(Arc::new(CountingObserver {
                id: ObserverId::new("broken").unwrap(),
                calls: calls.clone(),
                fail: true,
            }))
            .unwrap();

        let (observations, error) = registry.check_all(CancellationToken::new()).await;
        assert_eq!(observations.len(), 1);
        let error = error.expect("one observer failed");
        assert_eq!(error.failures().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

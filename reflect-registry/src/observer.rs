//! The observer capability consumed by the registry.

use async_trait::async_trait;
use reflect_core::ObserverId;
use tokio_util::sync::CancellationToken;

use crate::error::ObserverError;
use crate::observation::Observation;

/// A registered capability producing zero or more observations per
/// invocation. Implementations should be side-effect-light and honor the
/// supplied cancellation token.
#[async_trait]
pub trait Observer: Send + Sync {
    /// The observer's unique identifier within its registry.
    fn id(&self) -> &ObserverId;

    /// Runs the observer once, returning any observations it produced and an
    /// optional error describing a partial or total failure.
    async fn check(&self, cancellation: CancellationToken) -> (Vec<Observation>, Option<ObserverError>);
}

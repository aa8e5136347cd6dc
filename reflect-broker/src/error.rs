//! Error types for the permission broker.

use reflect_core::GrantId;
use thiserror::Error;

/// Errors surfaced by [`crate::PermissionBroker`] operations.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// `revoke` was called with an id that does not (or no longer) exist.
    #[error("grant `{0}` not found")]
    GrantNotFound(GrantId),
}

/// Result alias for broker mutations.
pub type BrokerResult<T> = Result<T, BrokerError>;

//! Error types for feature flag operations.

use thiserror::Error;

/// Result type for feature flag operations.
pub type FeatureResult<T> = Result<T, FeatureError>;

/// Feature flag errors.
///
/// Every public registry operation returns these as values so that
/// callers can distinguish "configured but off" from "does not exist"
/// or "rejected." The registry never retries; retry policy belongs to
/// the store adapters or the embedding application.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Lookup or resolution requested for a key that is not registered
    #[error("Unknown feature flag: {0}")]
    UnknownFlag(String),

    /// Registration requested for a key that is already taken
    #[error("Feature flag already registered: {0}")]
    DuplicateFlag(String),

    /// A query override referenced a flag that is not queryable
    #[error("Feature flag is not queryable: {0}")]
    NotQueryable(String),

    /// Publication requested for a flag that is not stable
    #[error("Feature flag is not stable: {0}")]
    UnstableFlag(String),

    /// Group mutation requested for a key that is not loaded
    #[error("Feature group not found: {0}")]
    GroupNotFound(String),

    /// Group creation requested for a slug that already exists
    #[error("Feature group already exists: {0}")]
    DuplicateGroup(String),

    /// Store adapter failure
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

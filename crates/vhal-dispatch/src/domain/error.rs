//! Dispatcher error types.
//!
//! Every service-level failure maps to a [`StatusCode`] carried back to the
//! caller as a service-specific error code.

use thiserror::Error;
use vhal_types::StatusCode;

/// Service-level errors returned synchronously from the dispatcher.
///
/// None of these invoke the caller's callback: a batch either fails here or is
/// accepted and resolved through the callback.
#[derive(Debug, Error)]
pub enum VhalError {
    /// Structural problem with a batch (duplicate ids, duplicate targets,
    /// request id already pending, unknown property in a config lookup).
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Hardware rejected the whole batch at submission.
    #[error("hardware rejected batch: {0}")]
    Hardware(StatusCode),

    /// A batch could not be encoded or decoded.
    #[error("large payload codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The service was constructed outside a tokio runtime.
    #[error("no tokio runtime available for the timeout sweeper")]
    NoRuntime,
}

impl VhalError {
    /// Status code reported to the caller for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidArg(_) | Self::Codec(_) => StatusCode::InvalidArg,
            Self::Hardware(status) => *status,
            Self::Config(_) | Self::NoRuntime => StatusCode::InternalError,
        }
    }
}

impl From<PoolError> for VhalError {
    fn from(error: PoolError) -> Self {
        Self::InvalidArg(error.to_string())
    }
}

/// Result alias for dispatcher operations.
pub type VhalResult<T> = Result<T, VhalError>;

/// Reservation conflict in the pending request pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("request id {0} is already pending")]
    DuplicateRequestId(i64),
}

/// Large payload encoding failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode batch: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode shared memory region: {0}")]
    Decode(#[source] bincode::Error),
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("invalid large payload threshold: {0}")]
    InvalidThreshold(String),
}

//! Domain types for the dispatcher.
//!
//! Configuration, errors, the pending request pool and request validation.
//! Nothing here talks to hardware or callbacks directly.

pub mod batch;
pub mod config;
pub mod error;
pub mod pending;
pub mod property_store;
pub mod validation;

// Re-exports for convenience
pub use batch::BatchResult;
pub use config::VhalConfig;
pub use error::{CodecError, ConfigError, PoolError, VhalError, VhalResult};
pub use pending::{PendingOwner, PendingRequestPool, PendingStats};
pub use property_store::PropertyConfigStore;
pub use validation::ValueError;

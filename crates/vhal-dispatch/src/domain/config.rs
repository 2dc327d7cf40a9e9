//! Dispatcher configuration with validation.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Default deadline for a request pending on hardware.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Encoded batch size above which results move to shared memory.
pub const DEFAULT_LARGE_PAYLOAD_THRESHOLD: usize = 4096;

/// Environment override for the request timeout, in nanoseconds.
pub const ENV_REQUEST_TIMEOUT_NS: &str = "VHAL_REQUEST_TIMEOUT_NS";

/// Environment override for the large payload threshold, in bytes.
pub const ENV_LARGE_PAYLOAD_THRESHOLD: &str = "VHAL_LARGE_PAYLOAD_THRESHOLD";

/// Dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VhalConfig {
    /// How long a request may stay pending on hardware before it resolves
    /// with TRY_AGAIN.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Batches whose encoded size exceeds this many bytes travel through
    /// shared memory.
    pub large_payload_threshold: usize,
}

impl Default for VhalConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            large_payload_threshold: DEFAULT_LARGE_PAYLOAD_THRESHOLD,
        }
    }
}

impl VhalConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "request_timeout cannot be 0".into(),
            ));
        }

        if self.large_payload_threshold == 0 {
            return Err(ConfigError::InvalidThreshold(
                "large_payload_threshold cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Defaults overridden by `VHAL_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Unparsable values are ignored with a
    /// warning.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_NS) {
            match raw.trim().parse::<u64>() {
                Ok(nanos) => {
                    self.request_timeout = Duration::from_nanos(nanos);
                    info!(timeout_ns = nanos, "Loaded request timeout from environment");
                }
                Err(e) => warn!(value = %raw, error = %e, "Ignoring {}", ENV_REQUEST_TIMEOUT_NS),
            }
        }

        if let Some(raw) = lookup(ENV_LARGE_PAYLOAD_THRESHOLD) {
            match raw.trim().parse::<usize>() {
                Ok(bytes) => self.large_payload_threshold = bytes,
                Err(e) => {
                    warn!(value = %raw, error = %e, "Ignoring {}", ENV_LARGE_PAYLOAD_THRESHOLD)
                }
            }
        }

        self
    }
}

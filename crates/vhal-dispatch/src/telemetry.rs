//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Log output settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Filter used when `RUST_LOG` is unset or invalid.
    pub default_level: String,
    pub thread_ids: bool,
    /// Write through the libtest capture instead of stdout.
    pub test_writer: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            thread_ids: true,
            test_writer: false,
        }
    }
}

impl TracingConfig {
    pub fn for_tests() -> Self {
        Self {
            default_level: "debug".to_string(),
            thread_ids: false,
            test_writer: true,
        }
    }
}

/// Install the global fmt subscriber, honouring `RUST_LOG`.
///
/// Returns false if a global subscriber was already installed.
pub fn init_tracing(config: &TracingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(config.thread_ids);

    let installed = if config.test_writer {
        builder.with_test_writer().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}

//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber once per binary
//! - Resolve the log level from `RUST_LOG`, then the configured level
//!
//! # Design Decisions
//! - Human-readable output on stderr so command output on stdout stays clean
//! - Initialization is idempotent; a second call is ignored

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with `level` as the fallback for this crate and `tower_http`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let initialized = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if initialized.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

fn default_directives(level: &str) -> String {
    format!("api_mesh={level},mesh_server={level},tower_http={level}")
}

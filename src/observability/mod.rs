//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! CLI commands and the gateway server produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr
//!     → Metrics endpoint (Prometheus scrape, server only)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every server log line
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

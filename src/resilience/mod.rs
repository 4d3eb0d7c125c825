//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to the mesh management service:
//!     → client timeout (every call has a deadline)
//!     → On failure: retries.rs (check if retryable, retry with backoff)
//! ```

pub mod retries;

pub use retries::{calculate_backoff, is_retryable, max_attempts};

//! Retry logic for calls to the mesh management service.
//!
//! # Responsibilities
//! - Determine if a request is retryable (safe methods only)
//! - Compute exponential backoff with jitter between attempts
//!
//! # Design Decisions
//! - Never retry POST/PUT/DELETE/PATCH against the service; a create,
//!   update or delete that timed out may still have been applied
//! - Connection errors, 5xx and 429 are retryable
//! - Jittered backoff prevents synchronized retries

use std::time::Duration;

use rand::Rng;
use reqwest::{Method, StatusCode};

use crate::config::RetryConfig;

/// Whether a failed attempt may be retried.
pub fn is_retryable(method: &Method, status: Option<StatusCode>, network_error: bool) -> bool {
    if !method.is_safe() {
        return false;
    }
    if network_error {
        return true;
    }
    matches!(status, Some(s) if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS)
}

/// Maximum number of attempts for `method` under `config`.
pub fn max_attempts(config: &RetryConfig, method: &Method) -> u32 {
    if config.enabled && method.is_safe() {
        config.max_attempts.max(1)
    } else {
        1
    }
}

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    // Jitter: 0 to 10% of the delay
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

//! Request identification.
//!
//! # Responsibilities
//! - Assign a UUID v4 request id when the client sent no `x-request-id`
//! - Echo the request id on the response
//! - Read the request id and the metadata opt-in from request headers
//!
//! # Design Decisions
//! - The request id is set as the outermost layer so every span and log line
//!   of the handler can carry it
//! - A client-supplied id is kept as is, so it is not unique; the header
//!   cache uses its own per-request key

use axum::http::{HeaderMap, HeaderName};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Opt-in header for forwarding source response headers.
pub const X_INCLUDE_METADATA: &str = "x-include-metadata";

/// Layer assigning a request id to requests that carry none.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer copying the request id onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// The request id, or `"unknown"` outside the request id layers.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// `x-include-metadata: true`, compared case-insensitively.
pub fn include_metadata(headers: &HeaderMap) -> bool {
    headers
        .get(X_INCLUDE_METADATA)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

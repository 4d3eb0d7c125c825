//! Per-request source header cache.
//!
//! # Responsibilities
//! - Cache the response headers each source returned for a request, keyed by
//!   a server-generated per-request key (`prep_source_response_headers`)
//! - Compute the headers sent back to the client (`process_response_headers`)
//! - Evict a request's entry once the response is built (`remove_request_headers`)
//!
//! # Design Decisions
//! - `responseConfig.headers` always come first and are never overridden by
//!   source headers
//! - Source headers are only forwarded when the client asked for metadata
//! - Hop-by-hop and body framing headers never leave the gateway
//! - Cache validators from sources are dropped for non-GET requests

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, AGE, CACHE_CONTROL, CONNECTION, CONTENT_ENCODING,
    CONTENT_LENGTH, ETAG, EXPIRES, LAST_MODIFIED, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION, TE,
    TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use axum::http::Method;
use dashmap::DashMap;
use serde_json::Value;

use crate::mesh::schema::ResponseConfig;
use crate::observability::metrics;

static HOP_BY_HOP_NAMES: &[HeaderName] = &[
    CONNECTION,
    TRANSFER_ENCODING,
    TE,
    TRAILER,
    UPGRADE,
    PROXY_AUTHORIZATION,
    PROXY_AUTHENTICATE,
];

static FRAMING_NAMES: &[HeaderName] = &[CONTENT_LENGTH, CONTENT_ENCODING];

static CACHE_VALIDATOR_NAMES: &[HeaderName] = &[CACHE_CONTROL, ETAG, EXPIRES, LAST_MODIFIED, AGE];

/// Whether `name` describes the connection or the body encoding rather than
/// the payload, and so must not be copied onto a rebuilt response.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_NAMES.contains(name)
        || FRAMING_NAMES.contains(name)
        || name.as_str() == "keep-alive"
}

pub fn is_cache_validator(name: &HeaderName) -> bool {
    CACHE_VALIDATOR_NAMES.contains(name)
}

/// Copy `headers` without hop-by-hop and framing headers.
pub fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Headers returned by the sources of one request, in source order.
type SourceHeaders = Vec<(HeaderName, HeaderValue)>;

/// Source response headers, keyed by request id.
#[derive(Debug, Default)]
pub struct HeaderCache {
    entries: DashMap<String, SourceHeaders>,
}

impl HeaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests with cached headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cache the `response.headers` of every `httpDetails` entry under
    /// `request_id`. Entries without headers are skipped, as are names or
    /// values that are not valid HTTP.
    pub fn prep_source_response_headers(&self, http_details: Option<&Value>, request_id: &str) {
        let Some(details) = http_details.and_then(Value::as_array) else {
            return;
        };

        let mut collected = SourceHeaders::new();
        for detail in details {
            let Some(headers) = detail.pointer("/response/headers").and_then(Value::as_object) else {
                continue;
            };

            for (name, value) in headers {
                let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                    tracing::debug!(request_id = %request_id, header = %name, "Skipping invalid source header name");
                    continue;
                };
                for value in header_values(value) {
                    if let Ok(value) = HeaderValue::from_str(&value) {
                        collected.push((name.clone(), value));
                    }
                }
            }
        }

        self.entries.insert(request_id.to_string(), collected);
        metrics::set_header_cache_entries(self.entries.len());
    }

    /// Headers for the client response of `request_id`.
    pub fn process_response_headers(
        &self,
        response_config: &ResponseConfig,
        request_id: &str,
        include_metadata: bool,
        method: &Method,
    ) -> HeaderMap {
        let mut headers = HeaderMap::new();

        for (name, value) in &response_config.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Ignoring invalid responseConfig header"),
            }
        }

        if !include_metadata {
            return headers;
        }

        let Some(cached) = self.entries.get(request_id) else {
            return headers;
        };

        let configured: Vec<HeaderName> = headers.keys().cloned().collect();
        for (name, value) in cached.iter() {
            if is_hop_by_hop(name) || configured.contains(name) {
                continue;
            }
            if method != Method::GET && is_cache_validator(name) {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }

        headers
    }

    /// Evict the cached headers of `request_id`.
    pub fn remove_request_headers(&self, request_id: &str) {
        self.entries.remove(request_id);
        metrics::set_header_cache_entries(self.entries.len());
    }
}

fn header_values(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(header_values).collect(),
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(b) => vec![b.to_string()],
        Value::Null | Value::Object(_) => Vec::new(),
    }
}

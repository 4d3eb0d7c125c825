//! CORS layer built from `responseConfig.CORS`.
//!
//! A wildcard (`*`) is honoured for origins, methods and headers. When
//! credentials are allowed the wildcard is replaced by mirroring the request,
//! since browsers reject `*` together with credentials.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, ExposeHeaders};

use crate::mesh::schema::{CorsConfig, CorsOrigin};

const WILDCARD: &str = "*";

/// Build the CORS layer for a mesh, or `None` when the mesh configures none.
pub fn cors_layer(config: Option<&CorsConfig>) -> Option<CorsLayer> {
    let config = config?;
    let credentials = config.credentials;

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin(config.origin.as_ref(), credentials))
        .allow_credentials(credentials);

    if !config.methods.is_empty() {
        layer = layer.allow_methods(allow_methods(&config.methods, credentials));
    }
    if !config.allowed_headers.is_empty() {
        layer = layer.allow_headers(allow_headers(&config.allowed_headers, credentials));
    }
    if !config.exposed_headers.is_empty() {
        layer = layer.expose_headers(expose_headers(&config.exposed_headers, credentials));
    }
    if let Some(max_age) = config.max_age {
        layer = layer.max_age(Duration::from_secs(max_age));
    }

    Some(layer)
}

fn allow_origin(origin: Option<&CorsOrigin>, credentials: bool) -> AllowOrigin {
    let origins: Vec<&str> = match origin {
        None => vec![WILDCARD],
        Some(CorsOrigin::One(origin)) => vec![origin.as_str()],
        Some(CorsOrigin::Many(origins)) => origins.iter().map(String::as_str).collect(),
    };

    if origins.contains(&WILDCARD) {
        return if credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::any()
        };
    }

    AllowOrigin::list(origins.into_iter().filter_map(|origin| {
        HeaderValue::from_str(origin)
            .map_err(|_| tracing::warn!(origin = %origin, "Ignoring invalid CORS origin"))
            .ok()
    }))
}

fn allow_methods(methods: &[String], credentials: bool) -> AllowMethods {
    if methods.iter().any(|m| m == WILDCARD) {
        return if credentials {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::any()
        };
    }

    AllowMethods::list(
        methods
            .iter()
            .filter_map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok()),
    )
}

fn allow_headers(headers: &[String], credentials: bool) -> AllowHeaders {
    if headers.iter().any(|h| h == WILDCARD) {
        return if credentials {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::any()
        };
    }

    AllowHeaders::list(header_names(headers))
}

fn expose_headers(headers: &[String], credentials: bool) -> ExposeHeaders {
    if headers.iter().any(|h| h == WILDCARD) && !credentials {
        return ExposeHeaders::any();
    }

    ExposeHeaders::list(header_names(headers))
}

fn header_names(headers: &[String]) -> Vec<HeaderName> {
    headers
        .iter()
        .filter(|h| h.as_str() != WILDCARD)
        .filter_map(|h| HeaderName::from_bytes(h.as_bytes()).ok())
        .collect()
}

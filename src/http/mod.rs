//! HTTP protocol handling for the gateway server.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, metadata opt-in)
//!     → artifact gateway (GraphQL execution)
//!     → headers.rs (cache source headers, compute response headers, evict)
//!     → cors.rs (mesh-owned CORS policy)
//!     → Send to client
//! ```

pub mod cors;
pub mod headers;
pub mod request;
pub mod server;

pub use headers::HeaderCache;
pub use request::{X_INCLUDE_METADATA, X_REQUEST_ID};
pub use server::{HttpServer, ServerContext, TenantContext, MESH_TIER_ENV, TENANT_UUID_ENV};

//! Mesh management service.
//!
//! # Responsibilities
//! - Typed payloads of the service API (`types.rs`)
//! - The authenticated, retrying HTTP client (`client.rs`)
//!
//! # Design Decisions
//! - One client per CLI invocation, carrying that invocation's request id
//! - Only safe methods are retried; creates, updates and deletes are sent once

pub mod client;
pub mod error;
pub mod types;

pub use client::MeshServiceClient;
pub use error::ServiceError;
pub use types::{MeshDeployment, MeshDetails, PresignedUrl, PresignedUrls, TenantFeatures};

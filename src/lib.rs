//! API Mesh tooling.
//!
//! Library behind the `api-mesh` CLI and the `mesh-server` gateway.

// Mesh documents
pub mod mesh;

// Core subsystems
pub mod artifact;
pub mod config;
pub mod http;
pub mod service;

// Commands
pub mod commands;
pub mod logs;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

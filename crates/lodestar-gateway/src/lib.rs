//! Lodestar Gateway - HTTP dispatch for list-watch sessions
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - SSE list-watch endpoints for typed and generic resource collections
//! - CRUD pass-through handlers (GET, POST, DELETE)
//! - Per-request authorization against the upstream access-review endpoint

pub mod error;
pub mod handlers;
pub mod response;
pub mod server;
pub mod state;

// Re-export commonly used types
pub use error::{ApiError, Result};
pub use server::{Config, GatewayServer};
pub use state::{AppState, DEFAULT_CHUNK_LIMIT};

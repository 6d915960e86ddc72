//! Lodestar Client - access to the upstream collection API
//!
//! This crate provides:
//! - The `ResourceClient` and `AccessReview` trait seams the engine runs on
//! - reqwest-based HTTP implementations of both
//! - Scripted mocks for testing session behavior

pub mod authz;
pub mod http;
pub mod mock;
pub mod traits;

// Re-export commonly used types
pub use authz::HttpAccessReview;
pub use http::HttpResourceClient;
pub use mock::{MockAccessReview, MockResourceClient};
pub use traits::{AccessReview, CascadePolicy, EventStream, ResourceClient, Verb};

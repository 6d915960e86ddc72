//! Lodestar Core - Fundamental types for the Lodestar list-watch gateway
//!
//! This crate provides:
//! - Resource identity and cursor types (GVK, watch targets, resource versions)
//! - Collection page and watch event models
//! - The `WatchItem` capability trait with typed/untyped adapters
//! - Error types with miette diagnostics

pub mod error;
pub mod events;
pub mod item;
pub mod types;

// Re-export commonly used types
pub use error::{LodestarError, Result};
pub use events::{WatchEvent, WatchEventType};
pub use item::{DynamicObject, TypedObject, WatchItem};
pub use types::{
    CollectionPage, ContinueToken, GroupVersionKind, ResourceVersion, WatchTarget,
};

// Re-export k8s-openapi types for convenience
pub use k8s_openapi;
pub use k8s_openapi::api::core::v1::Pod;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Serialize an item to JSON
pub fn to_json<T: serde::Serialize>(item: &T) -> Result<String> {
    serde_json::to_string(item).map_err(|e| {
        LodestarError::serialization(
            format!("Failed to serialize to JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize an item from JSON
pub fn from_json<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_json::from_str(data).map_err(|e| {
        LodestarError::serialization(
            format!("Failed to deserialize from JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

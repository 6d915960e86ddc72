use lodestar_client::{AccessReview, HttpAccessReview, HttpResourceClient, ResourceClient};
use lodestar_core::{DynamicObject, Pod, TypedObject};
use std::sync::Arc;

/// Process-wide page/chunk size limit for snapshot pagination
pub const DEFAULT_CHUNK_LIMIT: u32 = 100;

/// Shared application state
///
/// Client handles are passed explicitly per session; nothing here carries
/// per-session cursor or version state.
#[derive(Clone)]
pub struct AppState {
    /// Client for untyped custom-resource collections
    pub dynamic_client: Arc<dyn ResourceClient<DynamicObject>>,

    /// Client for the typed pod collection
    pub pod_client: Arc<dyn ResourceClient<TypedObject<Pod>>>,

    /// Authorization oracle, consulted once per request
    pub authz: Arc<dyn AccessReview>,

    /// Snapshot page-size limit
    pub chunk_limit: u32,
}

impl AppState {
    /// Create an AppState from explicit collaborators
    pub fn new(
        dynamic_client: Arc<dyn ResourceClient<DynamicObject>>,
        pod_client: Arc<dyn ResourceClient<TypedObject<Pod>>>,
        authz: Arc<dyn AccessReview>,
        chunk_limit: u32,
    ) -> Self {
        Self {
            dynamic_client,
            pod_client,
            authz,
            chunk_limit,
        }
    }

    /// Create an AppState backed by one HTTP client against `base_url`
    pub fn from_upstream(base_url: &str, chunk_limit: u32) -> Self {
        let client = Arc::new(HttpResourceClient::new(base_url));
        Self {
            dynamic_client: Arc::clone(&client) as Arc<dyn ResourceClient<DynamicObject>>,
            pod_client: client,
            authz: Arc::new(HttpAccessReview::new(base_url)),
            chunk_limit,
        }
    }
}

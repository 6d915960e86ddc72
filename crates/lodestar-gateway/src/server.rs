use crate::handlers::{
    create_custom_resource, delete_custom_resource, get_custom_resource, list_custom_resources,
    list_pods,
};
use crate::AppState;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Gateway server configuration
#[derive(Clone)]
pub struct Config {
    /// Address to listen on
    pub listen_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".parse().unwrap(),
        }
    }
}

/// Gateway server
pub struct GatewayServer {
    config: Config,
    state: Arc<AppState>,
}

impl GatewayServer {
    /// Create a new gateway server
    pub fn new(config: Config, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Build the router
    fn build_router(&self) -> Router {
        Router::new()
            // Health checks
            .route("/healthz", get(healthz))
            .route("/livez", get(livez))
            .route("/readyz", get(readyz))
            // Typed pod collection
            .route("/api/v1/namespaces/{namespace}/pods", get(list_pods))
            // Generic custom-resource collections
            .route(
                "/apis/{group}/{version}/namespaces/{namespace}/{resource}",
                get(list_custom_resources).post(create_custom_resource),
            )
            .route(
                "/apis/{group}/{version}/namespaces/{namespace}/{resource}/{name}",
                get(get_custom_resource).delete(delete_custom_resource),
            )
            // Add tracing and state
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server
    pub async fn run(self) -> Result<(), std::io::Error> {
        let app = self.build_router();

        info!("Starting gateway on {}", self.config.listen_addr);

        let listener = TcpListener::bind(self.config.listen_addr).await?;

        axum::serve(listener, app).await
    }
}

/// Health check endpoint
async fn healthz() -> &'static str {
    "ok"
}

/// Liveness probe
async fn livez() -> &'static str {
    "ok"
}

/// Readiness probe
async fn readyz() -> &'static str {
    "ok"
}

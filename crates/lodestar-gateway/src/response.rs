use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// API response wrapper
pub struct ApiResponse<T: Serialize> {
    status: StatusCode,
    body: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new response with 200 OK
    pub fn ok(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// Create a new response with 201 Created
    pub fn created(body: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Create a deletion Status response
pub fn status_deleted(name: &str, resource: &str) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "apiVersion": "v1",
            "kind": "Status",
            "status": "Success",
            "message": format!("{} {} deleted", resource, name),
            "code": 200
        })),
    )
        .into_response()
}

/// One-shot list response body
#[derive(Serialize)]
pub struct ListResponse<T: Serialize> {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub items: Vec<T>,
    pub metadata: ListMetadata,
}

/// List metadata
#[derive(Serialize)]
pub struct ListMetadata {
    #[serde(rename = "resourceVersion")]
    pub resource_version: String,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(api_version: String, items: Vec<T>, resource_version: String) -> Self {
        Self {
            api_version,
            kind: "List".to_string(),
            items,
            metadata: ListMetadata { resource_version },
        }
    }
}

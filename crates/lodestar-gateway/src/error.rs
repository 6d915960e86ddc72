use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lodestar_core::LodestarError;
use serde_json::json;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Authorization denied (403)
    Forbidden(String),

    /// Invalid input (400)
    BadRequest(String),

    /// Resource not found (404)
    NotFound(String),

    /// Upstream API failure (502)
    BadGateway(String),

    /// Internal server error (500)
    Internal(String),
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "apiVersion": "v1",
            "kind": "Status",
            "status": "Failure",
            "message": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<LodestarError> for ApiError {
    fn from(err: LodestarError) -> Self {
        match err {
            LodestarError::PermissionDenied { .. } => ApiError::Forbidden(err.to_string()),
            LodestarError::Transport { .. } => ApiError::BadGateway(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_maps_to_forbidden() {
        let err: ApiError =
            LodestarError::permission_denied("list", "kubeflow.org/v1/notebooks/user-ns").into();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_transport_maps_to_bad_gateway() {
        let err: ApiError = LodestarError::transport("connection reset", None).into();
        assert!(matches!(err, ApiError::BadGateway(_)));
    }
}

//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use projections::ProjectionError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Projection engine error.
    Projection(ProjectionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Projection(err) => projection_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn projection_error_to_response(err: ProjectionError) -> (StatusCode, String) {
    match &err {
        ProjectionError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        ProjectionError::MalformedPayload(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        ProjectionError::Storage(_) => {
            tracing::error!(error = %err, "storage failure");
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
    }
}

impl From<ProjectionError> for ApiError {
    fn from(err: ProjectionError) -> Self {
        ApiError::Projection(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AggregateId;
    use projections::StorageError;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::from(ProjectionError::NotFound {
            model_type: "order",
            id: AggregateId::from("o1"),
        });
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let storage = ApiError::from(ProjectionError::from(StorageError::Unavailable(
            "down".to_string(),
        )));
        assert_eq!(storage.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let bad = ApiError::BadRequest("missing event_type".to_string());
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::error;

/// JSON error body: `{"error": <title>, "message": <detail>}`.
#[derive(Debug)]
pub struct JsonApiError {
    status: StatusCode,
    error: &'static str,
    message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message }
    }

    /// Error titled with the status' canonical reason, for extractor rejections.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("Error"), Some(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg)),
            ServiceError::NotFound(_) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(e.to_string())),
            ServiceError::Storage(_) => {
                error!(err = %e, "catalog storage failure");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some("catalog storage failure".into()))
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({"error": self.error, "message": self.message});
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn rejection_title_follows_status() -> anyhow::Result<()> {
        let resp = JsonApiError::from_status(StatusCode::PAYLOAD_TOO_LARGE, "failed to read stream").into_response();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: serde_json::Value = serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await?)?;
        assert_eq!(body["error"], "Payload Too Large");
        assert_eq!(body["message"], "failed to read stream");
        Ok(())
    }

    #[test]
    fn service_errors_map_to_statuses() {
        let e = JsonApiError::from(ServiceError::Validation("image required".into()));
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        let e = JsonApiError::from(ServiceError::not_found("product"));
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
        let e = JsonApiError::from(ServiceError::Storage("read document: denied".into()));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

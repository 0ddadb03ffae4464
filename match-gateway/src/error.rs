//! Error types for the gateway crate.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use match_core::CoreError;
use match_store::RegistryError;
use serde_json::json;

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// Validation, lookup or storage failure from the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The path segment is not a valid row id.
    #[error(transparent)]
    InvalidId(#[from] CoreError),

    /// The request body is not valid JSON.
    #[error("JSON parse error - {0}")]
    MalformedBody(String),

    /// The request did not declare a JSON content type.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The body could not be read, e.g. it is over the size limit.
    #[error("{message}")]
    BodyRejected { status: StatusCode, message: String },
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(r) => Self::UnsupportedMediaType(r.body_text()),
            JsonRejection::JsonSyntaxError(r) => Self::MalformedBody(r.body_text()),
            JsonRejection::JsonDataError(r) => Self::MalformedBody(r.body_text()),
            other => Self::BodyRejected { status: other.status(), message: other.body_text() },
        }
    }
}

fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": message.into() }))).into_response()
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Registry(RegistryError::Invalid(errors)) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            GatewayError::Registry(RegistryError::NotFound { .. }) | GatewayError::InvalidId(_) => {
                detail(StatusCode::NOT_FOUND, "Not found.")
            }
            GatewayError::Registry(err) => {
                tracing::error!(error = %err, "request failed in store");
                detail(StatusCode::INTERNAL_SERVER_ERROR, "A server error occurred.")
            }
            err @ GatewayError::MalformedBody(_) => detail(StatusCode::BAD_REQUEST, err.to_string()),
            GatewayError::UnsupportedMediaType(_) => detail(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported media type in request. Expected 'application/json'.",
            ),
            GatewayError::BodyRejected { status, message } => detail(status, message),
        }
    }
}

/// Errors raised while reading [`GatewayConfig`](crate::config::GatewayConfig).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// An environment variable holds an unusable value.
    #[error("invalid {var} '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use match_core::validation::{ValidationErrors, REQUIRED};
    use match_store::StoreError;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = match axum::body::to_bytes(resp.into_body(), 4096).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON: {e}"),
        }
    }

    #[tokio::test]
    async fn gateway_error_validation_returns_400_with_field_tree() {
        let mut errors = ValidationErrors::new();
        errors.add("name", REQUIRED);
        let resp = GatewayError::from(RegistryError::Invalid(errors)).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["name"][0], REQUIRED);
    }

    #[test]
    fn gateway_error_not_found_variants_map_to_404() {
        let missing = RegistryError::NotFound { resource: "tag", id: 3 };
        assert_eq!(GatewayError::from(missing).into_response().status(), StatusCode::NOT_FOUND);

        let bad_id = CoreError::InvalidId { resource: "tag", value: "x".to_owned() };
        assert_eq!(GatewayError::from(bad_id).into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn gateway_error_store_failure_returns_500_without_details() {
        let err = RegistryError::Store(StoreError::Config("disk on fire".to_owned()));
        let resp = GatewayError::from(err).into_response();
        assert_eq!(
            resp.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "store errors must map to 500"
        );
        let body = body_json(resp).await;
        assert_eq!(body["detail"], "A server error occurred.");
        assert!(!body.to_string().contains("disk on fire"), "internals must not leak");
    }

    #[test]
    fn gateway_error_body_rejection_keeps_its_status() {
        let err = GatewayError::BodyRejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".to_owned(),
        };
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn gateway_error_display_includes_message() {
        let err = GatewayError::MalformedBody("expected value at line 1".to_owned());
        let msg = err.to_string();
        assert!(msg.contains("expected value"), "Display must include the message");
        assert!(msg.starts_with("JSON parse error"));
    }
}

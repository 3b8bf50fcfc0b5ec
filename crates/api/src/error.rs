use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use overlay_client::{GatewayError, SettingsError};
use overlay_core::error::CoreError;
use overlay_core::schema::SchemaError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce `{ "error", "code" }` JSON bodies;
/// validation failures also carry `issues`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `overlay_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Settings failed schema validation.
    #[error(transparent)]
    Validation(#[from] SchemaError),

    /// The persistence gateway failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Validation(e) => AppError::Validation(e),
            SettingsError::Gateway(e) => AppError::Gateway(e),
            SettingsError::ReadOnly(widget) => {
                AppError::InternalError(format!("{widget} store is read-only"))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{key}' not found"),
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            // --- Gateway errors ---
            AppError::Gateway(err) => classify_gateway_error(err),

            // --- Schema validation ---
            AppError::Validation(err) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }

            // --- HTTP-specific errors ---
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let AppError::Validation(err) = &self {
            body["issues"] = json!(err.issues);
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Map a gateway failure to an HTTP status, error code, and message.
///
/// - `Transport` maps to 503; the client may retry.
/// - `Persistence` maps to 422 with the store's message; the constraint
///   name, if any, is logged but not exposed.
/// - `Resolution` maps to 404.
fn classify_gateway_error(err: &GatewayError) -> (StatusCode, &'static str, String) {
    match err {
        GatewayError::Transport(msg) => {
            tracing::warn!(error = %msg, "Store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "TRANSPORT_ERROR",
                "Settings store is temporarily unavailable".to_string(),
            )
        }
        GatewayError::Persistence { message, cause } => {
            tracing::error!(error = %message, cause = ?cause, "Settings write rejected");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PERSISTENCE_ERROR",
                message.clone(),
            )
        }
        GatewayError::Resolution(username) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("No overlay for username '{username}'"),
        ),
    }
}

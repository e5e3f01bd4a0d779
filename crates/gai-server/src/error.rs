use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gai_core::GaiError;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 500 responses with a caller-facing message
// ---------------------------------------------------------------------------

/// Carries a safe-to-expose message for a 500 through the `anyhow::Error`
/// chain. The underlying cause is logged by the handler, never returned.
#[derive(Debug)]
struct InternalError(String);

impl std::fmt::Display for InternalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for InternalError {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
///
/// Bodies have the shape `{"error": "<status reason>", "message": "..."}`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn unauthorized() -> Self {
        Self(GaiError::Unauthorized.into())
    }

    /// Construct a 500 whose message is shown to the caller as-is.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self(InternalError(msg.into()).into())
    }
}

fn body(status: StatusCode, message: String) -> Response {
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = serde_json::json!({ "error": reason, "message": message });
    (status, axum::Json(body)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(i) = self.0.downcast_ref::<InternalError>() {
            return body(StatusCode::INTERNAL_SERVER_ERROR, i.0.clone());
        }

        let Some(e) = self.0.downcast_ref::<GaiError>() else {
            return body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            );
        };

        let status = match e {
            GaiError::Unauthorized => StatusCode::UNAUTHORIZED,
            GaiError::MissingBatch(_) => StatusCode::BAD_REQUEST,
            GaiError::UnknownKind(_) => StatusCode::NOT_FOUND,
            GaiError::InvalidStatus(_) | GaiError::InvalidTransition { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            GaiError::StoreUnavailable(_)
            | GaiError::Config(_)
            | GaiError::Io(_)
            | GaiError::Yaml(_)
            | GaiError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal error".to_string()
        } else {
            e.to_string()
        };
        body(status, message)
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use gai_core::auth::{authorize, API_KEY_HEADER};

use crate::error::AppError;
use crate::state::AppState;

/// Axum middleware that gates relay routes behind the peer's shared secret.
///
/// Runs before any extractor touches the body, so a rejected request never
/// reaches validation or the store.
pub async fn require_api_key(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if authorize(presented, &app.api_key).is_authorized() {
        return next.run(req).await;
    }

    tracing::warn!(
        path = %req.uri().path(),
        key_present = presented.is_some(),
        "rejected relay call with invalid API key"
    );
    AppError::unauthorized().into_response()
}

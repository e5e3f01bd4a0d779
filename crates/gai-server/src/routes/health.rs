use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /health — unauthenticated liveness probe.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "system": app.system_name.as_ref(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_system_name() {
        let app = AppState::new("GAI", "SMART-CITY", "key");
        let result = health(State(app)).await;
        assert_eq!(result.0["status"], "ok");
        assert_eq!(result.0["system"], "GAI");
    }
}

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use chrono::SecondsFormat;
use gai_core::inbox::parse_batch;
use gai_core::RecordKind;

use crate::error::AppError;
use crate::state::AppState;

/// POST /relay/:kind — accept a batch of records from the peer.
///
/// The API key has already been checked by middleware. The body is read as
/// raw bytes so malformed JSON is reported as a validation failure rather
/// than an extractor rejection.
pub async fn receive_batch(
    State(app): State<AppState>,
    Path(kind): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let kind: RecordKind = kind.parse()?;
    let inbox = app.inbox(kind)?;
    let payloads = parse_batch(kind, &body)?;

    let receipt = inbox.accept(payloads).map_err(|e| {
        tracing::error!(kind = %kind, error = %e, "failed to store relay batch");
        AppError::internal(format!("Failed to process {kind}"))
    })?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Received {} {kind}", receipt.count),
        "count": receipt.count,
        "receivedAt": receipt.received_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        "ids": receipt.ids,
    })))
}

/// GET /relay/:kind — list every stored record of this kind.
pub async fn list_batch(
    State(app): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let kind: RecordKind = kind.parse()?;
    let records = app.inbox(kind)?.list().map_err(|e| {
        tracing::error!(kind = %kind, error = %e, "failed to list relay records");
        AppError::internal(format!("Failed to list {kind}"))
    })?;

    let mut body = serde_json::json!({
        "success": true,
        "count": records.len(),
    });
    body[kind.as_str()] = serde_json::to_value(&records)?;
    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use gai_core::record::Record;
    use gai_core::store::RecordStore;
    use std::sync::Arc;

    fn app() -> AppState {
        AppState::new("GAI", "SMART-CITY", "key")
    }

    /// A store whose every operation fails, to drive the 500 path.
    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn append(&self, _records: Vec<Record>) -> gai_core::Result<Vec<String>> {
            Err(gai_core::GaiError::StoreUnavailable("disk on fire".into()))
        }
        fn list(&self) -> gai_core::Result<Vec<Record>> {
            Err(gai_core::GaiError::StoreUnavailable("disk on fire".into()))
        }
        fn count(&self) -> gai_core::Result<usize> {
            Err(gai_core::GaiError::StoreUnavailable("disk on fire".into()))
        }
    }

    #[tokio::test]
    async fn receive_returns_ids_in_order() {
        let app = app();
        let body = Bytes::from_static(br#"{"orders":[{"title":"a"},{"title":"b"}]}"#);
        let result = receive_batch(State(app.clone()), Path("orders".into()), body)
            .await
            .unwrap();
        assert_eq!(result.0["success"], true);
        assert_eq!(result.0["message"], "Received 2 orders");
        let ids = result.0["ids"].as_array().unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids[0].as_str().unwrap().ends_with("-0"));
        assert!(ids[1].as_str().unwrap().ends_with("-1"));
        assert_eq!(app.inbox(RecordKind::Orders).unwrap().count().unwrap(), 2);
    }

    #[tokio::test]
    async fn receive_rejects_missing_array() {
        let app = app();
        let err = receive_batch(
            State(app.clone()),
            Path("fines".into()),
            Bytes::from_static(br#"{"orders":[]}"#),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(app.inbox(RecordKind::Fines).unwrap().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_kind_is_404() {
        let err = receive_batch(
            State(app()),
            Path("vehicles".into()),
            Bytes::from_static(b"{}"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn store_failure_is_500_with_kind_message() {
        let app = app().with_store(RecordKind::Cameras, Arc::new(BrokenStore));
        let err = receive_batch(
            State(app),
            Path("cameras".into()),
            Bytes::from_static(br#"{"cameras":[{}]}"#),
        )
        .await
        .unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn list_uses_kind_as_field_name() {
        let app = app();
        receive_batch(
            State(app.clone()),
            Path("impound".into()),
            Bytes::from_static(br#"{"impound":[{"plate":"95B777CA"}]}"#),
        )
        .await
        .unwrap();

        let result = list_batch(State(app), Path("impound".into())).await.unwrap();
        assert_eq!(result.0["count"], 1);
        let records = result.0["impound"].as_array().unwrap();
        assert_eq!(records[0]["payload"]["plate"], "95B777CA");
        assert_eq!(records[0]["provenance"], "EXTERNAL");
        assert_eq!(records[0]["relayStatus"], "NEW");
        assert_eq!(records[0]["source"], "SMART-CITY");
    }
}

use axum::http::StatusCode;
use gai_core::RecordKind;
use gai_server::AppState;
use http_body_util::BodyExt;
use tower::ServiceExt;

const KEY: &str = "smart-city-secret-key-2025";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn state() -> AppState {
    AppState::new("GAI", "SMART-CITY", KEY)
}

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    key: Option<&str>,
    body: Vec<u8>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(k) = key {
        builder = builder.header("x-api-key", k);
    }
    let req = builder.body(axum::body::Body::from(body)).unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    key: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, key, serde_json::to_vec(&body).unwrap()).await
}

async fn get(app: axum::Router, uri: &str, key: Option<&str>) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, key, Vec::new()).await
}

fn stored(state: &AppState, kind: RecordKind) -> usize {
    state.inbox(kind).unwrap().count().unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_public() {
    let app = gai_server::build_router(state());
    let (status, json) = get(app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn accepted_fine_is_listed_with_external_provenance() {
    let state = state();
    let app = gai_server::build_router(state.clone());

    let (status, json) = post_json(
        app.clone(),
        "/relay/fines",
        Some(KEY),
        serde_json::json!({ "fines": [{ "plate": "01A123BA", "amount": 500000 }] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Received 1 fines");
    assert_eq!(json["count"], 1);
    assert!(json["receivedAt"].as_str().unwrap().ends_with('Z'));
    let ids = json["ids"].as_array().unwrap();
    assert_eq!(ids.len(), 1);
    assert!(ids[0].as_str().unwrap().starts_with("GAI-FIN-"));
    assert!(ids[0].as_str().unwrap().ends_with("-0"));

    let (status, json) = get(app, "/relay/fines", Some(KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    let record = &json["fines"][0];
    assert_eq!(record["id"], ids[0]);
    assert_eq!(record["provenance"], "EXTERNAL");
    assert_eq!(record["relayStatus"], "NEW");
    assert!(record["arrivalTimestamp"].is_string());
    assert_eq!(record["payload"]["amount"], 500000);
    assert_eq!(stored(&state, RecordKind::Fines), 1);
}

#[tokio::test]
async fn wrong_key_is_rejected_without_side_effects() {
    let state = state();
    let app = gai_server::build_router(state.clone());

    let (status, json) = post_json(
        app,
        "/relay/fines",
        Some("wrong-key"),
        serde_json::json!({ "fines": [{ "plate": "01A123BA", "amount": 500000 }] }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Unauthorized");
    assert_eq!(json["message"], "Invalid API key");
    assert_eq!(stored(&state, RecordKind::Fines), 0);
}

#[tokio::test]
async fn auth_runs_before_body_validation() {
    let app = gai_server::build_router(state());
    let (status, _) = send(app, "POST", "/relay/orders", None, b"not json".to_vec()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_requires_key() {
    let app = gai_server::build_router(state());
    let (status, _) = get(app, "/relay/orders", Some("nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_array_is_rejected_entirely() {
    let state = state();
    let app = gai_server::build_router(state.clone());

    let (status, json) = post_json(
        app,
        "/relay/orders",
        Some(KEY),
        serde_json::json!({ "order": [{ "title": "Close Amir Temur street" }] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Bad Request");
    assert_eq!(json["message"], "orders array is required");
    assert_eq!(stored(&state, RecordKind::Orders), 0);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let state = state();
    let app = gai_server::build_router(state.clone());
    let (status, json) = send(app, "POST", "/relay/cameras", Some(KEY), b"{cameras:".to_vec()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "cameras array is required");
    assert_eq!(stored(&state, RecordKind::Cameras), 0);
}

#[tokio::test]
async fn empty_batch_is_accepted_as_noop() {
    let state = state();
    let app = gai_server::build_router(state.clone());
    let (status, json) = post_json(
        app,
        "/relay/orders",
        Some(KEY),
        serde_json::json!({ "orders": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Received 0 orders");
    assert_eq!(json["count"], 0);
    assert!(json["ids"].as_array().unwrap().is_empty());
    assert_eq!(stored(&state, RecordKind::Orders), 0);
}

#[tokio::test]
async fn unknown_kind_with_valid_key_is_404() {
    let app = gai_server::build_router(state());
    let (status, json) = post_json(
        app,
        "/relay/vehicles",
        Some(KEY),
        serde_json::json!({ "vehicles": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Not Found");
}

#[tokio::test]
async fn batch_order_is_preserved() {
    let state = state();
    let app = gai_server::build_router(state.clone());
    let orders: Vec<_> = (0..10)
        .map(|i| serde_json::json!({ "seq": i }))
        .collect();

    let (status, json) = post_json(
        app,
        "/relay/orders",
        Some(KEY),
        serde_json::json!({ "orders": orders }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<String> = json["ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    let records = state.inbox(RecordKind::Orders).unwrap().list().unwrap();
    assert_eq!(ids.len(), 10);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.id, ids[i]);
        assert_eq!(record.payload["seq"], i);
    }
}

#[tokio::test]
async fn ids_are_unique_across_batches() {
    let state = state();
    let app = gai_server::build_router(state.clone());
    let mut all = std::collections::HashSet::new();
    for _ in 0..20 {
        let (_, json) = post_json(
            app.clone(),
            "/relay/fines",
            Some(KEY),
            serde_json::json!({ "fines": [{}, {}, {}] }),
        )
        .await;
        for id in json["ids"].as_array().unwrap() {
            assert!(all.insert(id.as_str().unwrap().to_string()), "duplicate {id}");
        }
    }
    assert_eq!(all.len(), 60);
    assert_eq!(stored(&state, RecordKind::Fines), 60);
}

#[tokio::test]
async fn concurrent_batches_keep_internal_order() {
    let state = state();
    let app = gai_server::build_router(state.clone());

    let handles: Vec<_> = (0..8)
        .map(|batch| {
            let app = app.clone();
            tokio::spawn(async move {
                let fines: Vec<_> = (0..5)
                    .map(|i| serde_json::json!({ "batch": batch, "pos": i }))
                    .collect();
                post_json(
                    app,
                    "/relay/fines",
                    Some(KEY),
                    serde_json::json!({ "fines": fines }),
                )
                .await
            })
        })
        .collect();
    for h in handles {
        let (status, _) = h.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let records = state.inbox(RecordKind::Fines).unwrap().list().unwrap();
    assert_eq!(records.len(), 40);
    for chunk in records.chunks(5) {
        let batch = &chunk[0].payload["batch"];
        for (i, r) in chunk.iter().enumerate() {
            assert_eq!(&r.payload["batch"], batch);
            assert_eq!(r.payload["pos"], i);
        }
    }
}

#[tokio::test]
async fn kinds_are_stored_separately() {
    let state = state();
    let app = gai_server::build_router(state.clone());
    post_json(
        app.clone(),
        "/relay/cameras",
        Some(KEY),
        serde_json::json!({ "cameras": [{ "cameraId": "CAM-001" }] }),
    )
    .await;
    let (_, json) = get(app, "/relay/impound", Some(KEY)).await;
    assert_eq!(json["count"], 0);
    assert_eq!(stored(&state, RecordKind::Cameras), 1);
}

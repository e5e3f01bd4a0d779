pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::{middleware, Router};
use gai_core::config::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with the relay routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let relay = Router::new()
        .route(
            "/relay/{kind}",
            get(routes::relay::list_batch).post(routes::relay::receive_batch),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(relay)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the relay receiver on `server.bind:server.port` from `config`.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let app_state = AppState::from_config(config)?;
    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}

/// Start the relay receiver on a pre-bound listener.
///
/// Lets the caller read the actual port first (useful with port 0).
pub async fn serve_on(app_state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let system = app_state.system_name.clone();
    let app = build_router(app_state);

    tracing::info!("{system} relay receiver listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}

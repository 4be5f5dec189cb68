use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

mod error;
mod routes;
mod storage;

use storage::Store;

const DEFAULT_ADDR: &str = "0.0.0.0:3001";

#[derive(Clone, Default)]
pub struct AppState {
    pub store: Store,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/assemblies", get(routes::list_assemblies))
        .route(
            "/api/assemblies/{key}",
            get(routes::get_assembly).put(routes::put_assembly),
        )
        .route("/api/design_sessions", post(routes::create_session))
        .route(
            "/api/design_sessions/{uuid}",
            get(routes::get_session).patch(routes::patch_session),
        )
        .route("/api/design_sessions/{uuid}/geometry", get(routes::session_geometry))
        .route("/api/design_sessions/{uuid}/preview", get(routes::session_preview))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info".into()),
        )
        .init();

    let state = AppState {
        store: Store::with_catalog(),
    };

    let addr = std::env::var("PATTERN_SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{addr}");
    axum::serve(listener, router(state)).await
}

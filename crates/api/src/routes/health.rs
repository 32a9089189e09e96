use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when a dependency is down.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// The photo storage root exists and is a directory.
    pub storage_healthy: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = storybook_db::health_check(&state.pool).await.is_ok();
    let storage_healthy = tokio::fs::metadata(&state.config.storage.root)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);

    if !db_healthy || !storage_healthy {
        tracing::warn!(db_healthy, storage_healthy, "Health check degraded");
    }

    Json(HealthResponse {
        status: if db_healthy && storage_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        storage_healthy,
    })
}

/// `GET /health`, mounted at the root rather than under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

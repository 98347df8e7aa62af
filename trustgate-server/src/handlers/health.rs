//! `GET /health` (spec §6).

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;

use crate::graph_store::GraphStore;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Response {
    match state.graph_store.snapshot().await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "graph": {
                    "entities": snapshot.entities.len(),
                    "relations": snapshot.relations.len(),
                },
                "timestamp": Utc::now(),
            })),
        )
            .into_response(),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "error": err.to_string(),
                "timestamp": Utc::now(),
            })),
        )
            .into_response(),
    }
}

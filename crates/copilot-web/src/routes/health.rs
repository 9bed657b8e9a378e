//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
    pub active_sessions: usize,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        active_sessions: state.sessions.len().await,
    })
}

//! Liveness and database reachability.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `OK`, or `ERRO` when the database does not answer.
    pub status: &'static str,
    pub timestamp: String,
    /// Backend in use (`sqlite` / `postgres`).
    pub database: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.db.health_check().await;

    let (code, status) = if healthy {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "ERRO")
    };

    (
        code,
        Json(HealthResponse {
            status,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            database: state.db.backend().to_string(),
        }),
    )
}

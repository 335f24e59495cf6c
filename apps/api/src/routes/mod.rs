//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET    /api/produtos              public                              │
//! │  GET    /api/produtos/{id}         public                              │
//! │  POST   /api/produtos              RequireAdmin                        │
//! │  PUT    /api/produtos/{id}         RequireAdmin                        │
//! │  DELETE /api/produtos/{id}         RequireAdmin                        │
//! │                                                                         │
//! │  POST   /api/auth/login            public                              │
//! │  POST   /api/auth/alterar-senha    RequireAuth                         │
//! │  POST   /api/auth/register         always 403                          │
//! │                                                                         │
//! │  GET    /api/health                public                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod health;
pub mod produtos;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::error::ApiError;
use crate::AppState;

/// `{"mensagem": "..."}` success body.
#[derive(Debug, Serialize)]
pub struct Message {
    pub mensagem: &'static str,
}

impl Message {
    pub fn new(mensagem: &'static str) -> Self {
        Message { mensagem }
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = uri.path(),
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "request"
    );

    response
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Rota não encontrada".to_string())
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_size;

    Router::new()
        .route("/api/health", get(health::health))
        .merge(produtos::router())
        .merge(auth::router())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

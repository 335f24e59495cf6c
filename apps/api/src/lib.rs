//! # KPR API
//!
//! HTTP server for the sneaker storefront catalog.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           KPR API                                       │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  produtos      │  │  auth          │  │  health                    ││
//! │  │                │  │                │  │                            ││
//! │  │ • list / get   │  │ • login        │  │ • status + backend         ││
//! │  │ • create (adm) │  │ • alterar-senha│  │                            ││
//! │  │ • update (adm) │  │ • register 403 │  │                            ││
//! │  │ • delete (adm) │  │                │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────────────────┐  ┌────────────────────────────────┐│  │
//! │  │  │  kpr-db::Database        │  │    JwtManager (HS256)          ││  │
//! │  │  │  SQLite or PostgreSQL    │  │    RequireAuth / RequireAdmin  ││  │
//! │  │  └──────────────────────────┘  └────────────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig`]):
//! - `HOST` / `PORT` - bind address (default: 0.0.0.0:3001)
//! - `DATABASE_URL` - `sqlite://…` or `postgres://…` (default: sqlite://kpr.db)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `JWT_SECRET` - token signing secret
//! - `JWT_LIFETIME_SECS` - token lifetime (default: 86400)
//! - `MAX_BODY_SIZE` - request body limit in bytes (default: 1048576)

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;

// Re-exports
pub use auth::{Claims, JwtManager};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use kpr_db::Database;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState {
            jwt: JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs),
            db,
            config,
        }
    }
}

/// Builds the full router over shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    routes::create_router(state)
}

//! Catalog endpoints.
//!
//! Reads are public. Writes take [`RequireAdmin`] before the body so an
//! anonymous request is rejected with 401 whatever it sends.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use super::Message;
use crate::auth::RequireAdmin;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::AppState;
use kpr_core::validation::{validate_new_product, validate_product_update};
use kpr_core::{Product, ProductDraft};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/produtos", get(list).post(create))
        .route("/api/produtos/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Serialize)]
struct Created {
    mensagem: &'static str,
    #[serde(rename = "produtoId")]
    produto_id: i64,
}

fn product_not_found() -> ApiError {
    ApiError::NotFound("Produto não encontrado".to_string())
}

/// Ids that are not integers name no product.
fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.db.catalog().list().await?))
}

async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let id = parse_id(&id).ok_or_else(product_not_found)?;

    state
        .db
        .catalog()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(product_not_found)
}

async fn create(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let product = validate_new_product(draft)?;
    let id = state.db.catalog().create(&product).await?;

    info!(id, by = %admin.email, "Catalog: product created");

    Ok((
        StatusCode::CREATED,
        Json(Created {
            mensagem: "Produto criado com sucesso",
            produto_id: id,
        }),
    ))
}

async fn update(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> ApiResult<Json<Message>> {
    let id = parse_id(&id).ok_or_else(product_not_found)?;
    let changes = validate_product_update(draft)?;

    match state.db.catalog().update(id, &changes).await {
        Ok(()) => {}
        Err(e) if e.is_not_found() => return Err(product_not_found()),
        Err(e) => return Err(e.into()),
    }

    info!(id, by = %admin.email, "Catalog: product updated");
    Ok(Json(Message::new("Produto atualizado com sucesso")))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> ApiResult<Json<Message>> {
    if let Some(id) = parse_id(&id) {
        let removed = state.db.catalog().delete(id).await?;
        info!(id, removed, by = %admin.email, "Catalog: product deleted");
    }

    Ok(Json(Message::new("Produto deletado com sucesso")))
}

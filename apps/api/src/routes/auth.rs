//! Account endpoints: login, password change, and the closed registration.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Message;
use crate::auth::RequireAuth;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::AppState;
use kpr_core::validation::validate_new_password;
use kpr_core::PublicUser;
use kpr_db::{hash_password, verify_password};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/alterar-senha", post(change_password))
        .route("/api/auth/register", post(register))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub senha: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub mensagem: &'static str,
    pub token: String,
    pub usuario: PublicUser,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "senhaAtual")]
    pub senha_atual: Option<String>,
    #[serde(rename = "senhaNova")]
    pub senha_nova: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (Some(email), Some(senha)) = (non_blank(body.email), non_blank(body.senha)) else {
        return Err(ApiError::BadRequest(
            "Email e senha são obrigatórios".to_string(),
        ));
    };

    let invalid = || ApiError::Unauthorized("Email ou senha inválidos".to_string());

    let user = match state.db.users().find_by_email(email.trim()).await? {
        Some(user) => user,
        None => {
            warn!(email = %email, "Login for unknown email");
            return Err(invalid());
        }
    };

    if !verify_password(&senha, &user.senha_hash).await? {
        warn!(user_id = user.id, "Login with wrong password");
        return Err(invalid());
    }

    let token = state.jwt.issue(&user)?;
    info!(user_id = user.id, "Login succeeded");

    Ok(Json(LoginResponse {
        mensagem: "Login realizado com sucesso",
        token,
        usuario: PublicUser::from(&user),
    }))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    RequireAuth(claims): RequireAuth,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<Message>> {
    let (Some(atual), Some(nova)) = (non_blank(body.senha_atual), non_blank(body.senha_nova))
    else {
        return Err(ApiError::BadRequest(
            "Senha atual e nova senha são obrigatórias".to_string(),
        ));
    };

    if validate_new_password(&nova).is_err() {
        return Err(ApiError::BadRequest(
            "Nova senha deve ter pelo menos 6 caracteres".to_string(),
        ));
    }

    let users = state.db.users();
    let user = users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("Usuário não encontrado".to_string()))?;

    if !verify_password(&atual, &user.senha_hash).await? {
        warn!(user_id = user.id, "Password change with wrong current password");
        return Err(ApiError::Unauthorized("Senha atual incorreta".to_string()));
    }

    let hash = hash_password(&nova).await?;
    users.update_password(user.id, &hash).await?;

    Ok(Json(Message::new("Senha alterada com sucesso")))
}

async fn register() -> ApiError {
    ApiError::Forbidden(
        "Registro de novos usuários não permitido. Apenas o admin padrão pode acessar o sistema."
            .to_string(),
    )
}

// src/web/auth_handlers.rs
use crate::{
    error::AppResult,
    services::auth_service::Claims,
    state::AppState,
    web::extract::AppJson,
};
use axum::{
    extract::{Extension, State},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResposta {
    pub token: String,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct SessaoResposta {
    pub username: String,
    pub role: String,
}

// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginPayload>,
) -> AppResult<Json<LoginResposta>> {
    // A password nunca vai para o log
    tracing::info!("Tentativa de login para: {}", payload.username);
    let (token, claims) = state
        .autenticador
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(LoginResposta {
        token,
        username: claims.username,
        role: claims.role,
    }))
}

// GET /auth/validate
// As claims já foram validadas e inseridas pelo require_auth
pub async fn handle_validate(Extension(claims): Extension<Claims>) -> Json<SessaoResposta> {
    Json(SessaoResposta {
        username: claims.username,
        role: claims.role,
    })
}

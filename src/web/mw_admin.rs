// src/web/mw_admin.rs
use crate::{error::AppError, services::auth_service::Claims};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

/// Deve correr depois de `require_auth`, que insere as `Claims`.
pub async fn require_admin(
    Extension(claims): Extension<Claims>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !claims.eh_admin() {
        tracing::warn!("Admin MW: Acesso negado para '{}' (role {}).", claims.username, claims.role);
        return Err(AppError::Forbidden);
    }
    Ok(next.run(request).await)
}

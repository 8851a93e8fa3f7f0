// src/web/mw_auth.rs
use crate::{error::AppError, services::auth_service::Autenticador};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Exige `Authorization: Bearer <token>` válido e põe as `Claims` nas
/// extensões do pedido.
pub async fn require_auth(
    State(autenticador): State<Arc<Autenticador>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Autorização necessária".into()))?;

    let token = header
        .to_str()
        .ok()
        .and_then(|valor| valor.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Formato de autorização inválido".into()))?;

    let claims = autenticador.validar_token(token)?;
    tracing::debug!("Autenticação MW: '{}' ({}) autenticado.", claims.username, claims.role);

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

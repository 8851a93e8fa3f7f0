// src/error.rs
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro ao processar password")]
    PasswordHashingError,

    #[error("Erro ao gerar token: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Não autorizado: {0}")]
    Unauthorized(String),

    #[error("Acesso negado: requer privilégios de administrador")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    CapacityExceeded(String),

    // Contenção de locks que persistiu após todas as tentativas
    #[error("Base de dados ocupada, tente novamente")]
    Transient,

    // O pedido excedeu REQUEST_TIMEOUT_SECS
    #[error("Tempo limite do pedido excedido")]
    Timeout,

    #[error("Erro interno inesperado")]
    InternalServerError,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::CapacityExceeded(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Transient => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::SqlxError(_)
            | AppError::SqlxMigrateError(_)
            | AppError::Config(_)
            | AppError::PasswordHashingError
            | AppError::TokenError(_)
            | AppError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Como converter AppError numa resposta HTTP
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        // Detalhe completo só no log; o cliente recebe uma mensagem segura
        if status.is_server_error() {
            tracing::error!("Erro processado: {:?}", self);
        } else {
            tracing::warn!("Pedido recusado ({}): {}", status.as_u16(), self);
        }

        let user_message = match self {
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                "Erro ao aceder aos dados.".to_string()
            }
            AppError::Config(_) => "Erro de configuração.".to_string(),
            AppError::PasswordHashingError => "Erro ao processar credenciais.".to_string(),
            AppError::TokenError(_) => "Falha ao gerar token".to_string(),
            AppError::InternalServerError => "Ocorreu um erro inesperado.".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: user_message })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Dados inválidos: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(format!("ID inválido: {}", rejection.body_text()))
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;

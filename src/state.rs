// src/state.rs
use crate::{config::Config, services::auth_service::Autenticador};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub autenticador: Arc<Autenticador>,
    pub config: Arc<Config>,
}

// Permite extrair o pool da DB diretamente
impl axum::extract::FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> SqlitePool {
        state.db_pool.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<Autenticador> {
    fn from_ref(state: &AppState) -> Arc<Autenticador> {
        state.autenticador.clone()
    }
}

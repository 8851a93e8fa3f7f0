// src/web/inscricao_handlers.rs
use crate::{
    error::AppResult,
    models::inscricao::InscricaoDetalhada,
    services::{inscricao_service, relatorio_service},
    state::AppState,
    web::extract::{AppJson, AppPath},
};
use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Map, Value};

// GET /admin/inscricoes
pub async fn handle_listar_inscricoes(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<InscricaoDetalhada>>> {
    Ok(Json(inscricao_service::listar_inscricoes_detalhadas(&state.db_pool).await?))
}

// GET /admin/inscricoes/{id}
pub async fn handle_obter_inscricao(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<InscricaoDetalhada>> {
    Ok(Json(inscricao_service::obter_inscricao_detalhada(&state.db_pool, id).await?))
}

// DELETE /admin/inscricoes/{id}
pub async fn handle_cancelar_inscricao(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    // Apaga a inscrição e liberta a vaga na mesma transação
    inscricao_service::cancelar_inscricao(&state.db_pool, state.config.tx_tentativas, id).await?;
    Ok(Json(json!({ "message": "Inscrição cancelada com sucesso" })))
}

// POST /admin/relatorio
// Os registos chegam num formato livre; só as chaves conhecidas contam para o resumo
pub async fn handle_gerar_relatorio(
    AppJson(registos): AppJson<Vec<Map<String, Value>>>,
) -> AppResult<Json<Value>> {
    let resumo = relatorio_service::gerar_relatorio(&registos)?;
    Ok(Json(json!({
        "message": "Relatório gerado com sucesso",
        "resumo": resumo,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

// src/web/curso_handlers.rs
use crate::{
    error::AppResult,
    models::{
        curso::{AtualizarCurso, Curso, NovoCurso, VagasCurso},
        inscricao::Inscricao,
    },
    services::curso_service,
    state::AppState,
    web::extract::{AppJson, AppPath},
};
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

// GET /curso
pub async fn handle_listar_cursos(State(state): State<AppState>) -> AppResult<Json<Vec<Curso>>> {
    Ok(Json(curso_service::listar_cursos(&state.db_pool).await?))
}

// GET /curso/{id}
pub async fn handle_obter_curso(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Curso>> {
    Ok(Json(curso_service::obter_curso(&state.db_pool, id).await?))
}

// POST /curso
// vagasPreenchidas enviado pelo cliente é ignorado: um curso novo começa a zero
pub async fn handle_criar_curso(
    State(state): State<AppState>,
    AppJson(novo): AppJson<NovoCurso>,
) -> AppResult<(StatusCode, Json<Curso>)> {
    let curso = curso_service::criar_curso(&state.db_pool, novo).await?;
    Ok((StatusCode::CREATED, Json(curso)))
}

// PUT /curso/{id}
pub async fn handle_atualizar_curso(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(dados): AppJson<AtualizarCurso>,
) -> AppResult<Json<Curso>> {
    // Só os campos presentes são alterados; o curso fica travado durante a atualização
    let curso =
        curso_service::atualizar_curso(&state.db_pool, state.config.tx_tentativas, id, dados).await?;
    Ok(Json(curso))
}

// DELETE /curso/{id}
// Recusado (409) enquanto houver inscrições no curso
pub async fn handle_remover_curso(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    curso_service::remover_curso(&state.db_pool, id).await?;
    Ok(Json(json!({ "message": "Curso removido com sucesso" })))
}

// GET /curso/{id}/vagas
// Rota pública: totais, preenchidas e disponíveis
pub async fn handle_vagas_curso(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<VagasCurso>> {
    Ok(Json(curso_service::vagas_curso(&state.db_pool, id).await?))
}

// GET /curso/{id}/inscricoes
pub async fn handle_inscricoes_curso(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Vec<Inscricao>>> {
    Ok(Json(curso_service::listar_inscricoes_curso(&state.db_pool, id).await?))
}

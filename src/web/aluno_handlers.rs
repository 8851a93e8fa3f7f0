// src/web/aluno_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        aluno::{Aluno, AtualizarAluno, NovoAluno},
        inscricao::{CadastroInscricao, DetalhesInscricao, Inscricao, ResultadoInscricao},
    },
    services::{aluno_service, inscricao_service},
    state::AppState,
    web::extract::{AppJson, AppPath},
};
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

// GET /aluno
pub async fn handle_listar_alunos(State(state): State<AppState>) -> AppResult<Json<Vec<Aluno>>> {
    Ok(Json(aluno_service::listar_alunos(&state.db_pool).await?))
}

// GET /aluno/{id}
pub async fn handle_obter_aluno(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Aluno>> {
    Ok(Json(aluno_service::obter_aluno(&state.db_pool, id).await?))
}

// POST /aluno
pub async fn handle_criar_aluno(
    State(state): State<AppState>,
    AppJson(novo): AppJson<NovoAluno>,
) -> AppResult<(StatusCode, Json<Aluno>)> {
    let aluno = aluno_service::criar_aluno(&state.db_pool, novo).await?;
    Ok((StatusCode::CREATED, Json(aluno)))
}

// PUT /aluno/{id}
pub async fn handle_atualizar_aluno(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(dados): AppJson<AtualizarAluno>,
) -> AppResult<Json<Aluno>> {
    Ok(Json(aluno_service::atualizar_aluno(&state.db_pool, id, dados).await?))
}

// DELETE /aluno/{id}
// Com inscrições: a política configurada decide entre recusar (409) e remover em cascata
pub async fn handle_remover_aluno(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    aluno_service::remover_aluno(
        &state.db_pool,
        id,
        state.config.politica_remocao_aluno,
        state.config.tx_tentativas,
    )
    .await?;
    Ok(Json(json!({ "message": "Aluno removido com sucesso" })))
}

// POST /aluno/inscricao (público)
pub async fn handle_cadastrar_e_inscrever(
    State(state): State<AppState>,
    AppJson(pedido): AppJson<CadastroInscricao>,
) -> AppResult<(StatusCode, Json<ResultadoInscricao>)> {
    // Reutiliza o aluno se o email ou o CPF já existirem
    let resultado =
        inscricao_service::cadastrar_e_inscrever(&state.db_pool, state.config.tx_tentativas, pedido)
            .await?;
    Ok((StatusCode::CREATED, Json(resultado)))
}

// POST /aluno/{id}/curso/{cursoId}
// O corpo é opcional: sem ele a inscrição fica com os valores padrão.
pub async fn handle_inscrever_aluno(
    State(state): State<AppState>,
    AppPath((aluno_id, curso_id)): AppPath<(i64, i64)>,
    corpo: Bytes,
) -> AppResult<(StatusCode, Json<Value>)> {
    // Não dá para usar AppJson: um corpo vazio seria rejeitado
    let detalhes = if corpo.iter().all(u8::is_ascii_whitespace) {
        DetalhesInscricao::default()
    } else {
        serde_json::from_slice(&corpo)
            .map_err(|e| AppError::Validation(format!("Dados inválidos: {}", e)))?
    };

    let inscricao: Inscricao = inscricao_service::inscrever_aluno(
        &state.db_pool,
        state.config.tx_tentativas,
        aluno_id,
        curso_id,
        detalhes,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Aluno inscrito no curso com sucesso",
            "inscricao": inscricao,
        })),
    ))
}

// GET /aluno/{id}/inscricoes
pub async fn handle_inscricoes_aluno(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Vec<Inscricao>>> {
    Ok(Json(aluno_service::listar_inscricoes_aluno(&state.db_pool, id).await?))
}

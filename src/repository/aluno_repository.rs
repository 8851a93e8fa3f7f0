// src/repository/aluno_repository.rs
use crate::{
    error::AppResult,
    models::aluno::{Aluno, NovoAluno},
};
use sqlx::SqliteExecutor;

const SELECT_ALUNO: &str =
    "SELECT id, nome, cpf, email, sexo, telefone, data_nascto FROM alunos";

pub async fn listar<'e>(ex: impl SqliteExecutor<'e>) -> AppResult<Vec<Aluno>> {
    let sql = format!("{SELECT_ALUNO} ORDER BY id ASC");
    let alunos = sqlx::query_as::<_, Aluno>(&sql).fetch_all(ex).await?;
    Ok(alunos)
}

pub async fn buscar_por_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> AppResult<Option<Aluno>> {
    let sql = format!("{SELECT_ALUNO} WHERE id = ?1");
    let aluno = sqlx::query_as::<_, Aluno>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(aluno)
}

pub async fn buscar_por_email<'e>(ex: impl SqliteExecutor<'e>, email: &str) -> AppResult<Option<Aluno>> {
    // A coluna tem COLLATE NOCASE
    let sql = format!("{SELECT_ALUNO} WHERE email = ?1");
    let aluno = sqlx::query_as::<_, Aluno>(&sql)
        .bind(email)
        .fetch_optional(ex)
        .await?;
    Ok(aluno)
}

// CPF comparado como texto, tal como foi gravado
pub async fn buscar_por_cpf<'e>(ex: impl SqliteExecutor<'e>, cpf: &str) -> AppResult<Option<Aluno>> {
    let sql = format!("{SELECT_ALUNO} WHERE cpf = ?1");
    let aluno = sqlx::query_as::<_, Aluno>(&sql)
        .bind(cpf)
        .fetch_optional(ex)
        .await?;
    Ok(aluno)
}

/// Email ou CPF repetidos falham no índice UNIQUE; o serviço traduz para Conflict.
pub async fn inserir<'e>(ex: impl SqliteExecutor<'e>, novo: &NovoAluno) -> AppResult<Aluno> {
    let aluno = sqlx::query_as::<_, Aluno>(
        r#"
        INSERT INTO alunos (nome, cpf, email, sexo, telefone, data_nascto)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING id, nome, cpf, email, sexo, telefone, data_nascto
        "#,
    )
    .bind(&novo.nome)
    .bind(&novo.cpf)
    .bind(&novo.email)
    .bind(&novo.sexo)
    .bind(&novo.telefone)
    .bind(novo.data_nascto)
    .fetch_one(ex)
    .await?;
    Ok(aluno)
}

/// Grava todos os campos de `aluno`. Devolve o número de linhas afetadas.
pub async fn atualizar<'e>(ex: impl SqliteExecutor<'e>, aluno: &Aluno) -> AppResult<u64> {
    let linhas = sqlx::query(
        r#"
        UPDATE alunos
        SET nome = ?1, cpf = ?2, email = ?3, sexo = ?4, telefone = ?5, data_nascto = ?6
        WHERE id = ?7
        "#,
    )
    .bind(&aluno.nome)
    .bind(&aluno.cpf)
    .bind(&aluno.email)
    .bind(&aluno.sexo)
    .bind(&aluno.telefone)
    .bind(aluno.data_nascto)
    .bind(aluno.id)
    .execute(ex)
    .await?
    .rows_affected();
    Ok(linhas)
}

// Com inscrições ainda presentes a FK recusa o DELETE
pub async fn remover<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> AppResult<u64> {
    let linhas = sqlx::query("DELETE FROM alunos WHERE id = ?1")
        .bind(id)
        .execute(ex)
        .await?
        .rows_affected();
    Ok(linhas)
}

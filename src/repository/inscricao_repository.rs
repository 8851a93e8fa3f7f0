// src/repository/inscricao_repository.rs
use crate::{
    error::AppResult,
    models::inscricao::{Inscricao, NovaInscricao},
};
use sqlx::SqliteExecutor;

const COLUNAS: &str = "id, aluno_id, curso_id, data_inscricao, escolaridade, situacao_trabalho, \
    bairro, eh_cuidador, eh_pcd, tipo_pcd, necessita_elevador, como_soube, autoriza_whatsapp, \
    leva_notebook";

pub async fn listar<'e>(ex: impl SqliteExecutor<'e>) -> AppResult<Vec<Inscricao>> {
    let sql = format!("SELECT {COLUNAS} FROM inscricoes ORDER BY id ASC");
    Ok(sqlx::query_as::<_, Inscricao>(&sql).fetch_all(ex).await?)
}

pub async fn buscar_por_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> AppResult<Option<Inscricao>> {
    let sql = format!("SELECT {COLUNAS} FROM inscricoes WHERE id = ?1");
    Ok(sqlx::query_as::<_, Inscricao>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?)
}

// O par (aluno_id, curso_id) é único na tabela
pub async fn buscar_por_aluno_e_curso<'e>(
    ex: impl SqliteExecutor<'e>,
    aluno_id: i64,
    curso_id: i64,
) -> AppResult<Option<Inscricao>> {
    let sql = format!("SELECT {COLUNAS} FROM inscricoes WHERE aluno_id = ?1 AND curso_id = ?2");
    Ok(sqlx::query_as::<_, Inscricao>(&sql)
        .bind(aluno_id)
        .bind(curso_id)
        .fetch_optional(ex)
        .await?)
}

pub async fn listar_por_aluno<'e>(ex: impl SqliteExecutor<'e>, aluno_id: i64) -> AppResult<Vec<Inscricao>> {
    let sql = format!("SELECT {COLUNAS} FROM inscricoes WHERE aluno_id = ?1 ORDER BY id ASC");
    Ok(sqlx::query_as::<_, Inscricao>(&sql)
        .bind(aluno_id)
        .fetch_all(ex)
        .await?)
}

pub async fn listar_por_curso<'e>(ex: impl SqliteExecutor<'e>, curso_id: i64) -> AppResult<Vec<Inscricao>> {
    let sql = format!("SELECT {COLUNAS} FROM inscricoes WHERE curso_id = ?1 ORDER BY id ASC");
    Ok(sqlx::query_as::<_, Inscricao>(&sql)
        .bind(curso_id)
        .fetch_all(ex)
        .await?)
}

pub async fn contar_por_aluno<'e>(ex: impl SqliteExecutor<'e>, aluno_id: i64) -> AppResult<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM inscricoes WHERE aluno_id = ?1")
        .bind(aluno_id)
        .fetch_one(ex)
        .await?)
}

// Usado para recusar a remoção de cursos com inscrições
pub async fn contar_por_curso<'e>(ex: impl SqliteExecutor<'e>, curso_id: i64) -> AppResult<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM inscricoes WHERE curso_id = ?1")
        .bind(curso_id)
        .fetch_one(ex)
        .await?)
}

/// Tem de correr na mesma transação que ocupa a vaga do curso.
pub async fn inserir<'e>(ex: impl SqliteExecutor<'e>, nova: &NovaInscricao) -> AppResult<Inscricao> {
    let sql = format!(
        r#"
        INSERT INTO inscricoes (
            aluno_id, curso_id, data_inscricao, escolaridade, situacao_trabalho, bairro,
            eh_cuidador, eh_pcd, tipo_pcd, necessita_elevador, como_soube, autoriza_whatsapp,
            leva_notebook
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        RETURNING {COLUNAS}
        "#
    );
    Ok(sqlx::query_as::<_, Inscricao>(&sql)
        .bind(nova.aluno_id)
        .bind(nova.curso_id)
        .bind(nova.data_inscricao)
        .bind(&nova.escolaridade)
        .bind(&nova.situacao_trabalho)
        .bind(&nova.bairro)
        .bind(nova.eh_cuidador)
        .bind(nova.eh_pcd)
        .bind(&nova.tipo_pcd)
        .bind(nova.necessita_elevador)
        .bind(&nova.como_soube)
        .bind(nova.autoriza_whatsapp)
        .bind(nova.leva_notebook)
        .fetch_one(ex)
        .await?)
}

/// Apaga a inscrição e devolve o curso a que pertencia (`None` se não existia).
pub async fn remover<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> AppResult<Option<i64>> {
    Ok(
        sqlx::query_scalar("DELETE FROM inscricoes WHERE id = ?1 RETURNING curso_id")
            .bind(id)
            .fetch_optional(ex)
            .await?,
    )
}

/// Apaga todas as inscrições do aluno e devolve os cursos afetados.
pub async fn remover_por_aluno<'e>(ex: impl SqliteExecutor<'e>, aluno_id: i64) -> AppResult<Vec<i64>> {
    Ok(
        sqlx::query_scalar("DELETE FROM inscricoes WHERE aluno_id = ?1 RETURNING curso_id")
            .bind(aluno_id)
            .fetch_all(ex)
            .await?,
    )
}

// src/repository/curso_repository.rs
use crate::{
    error::AppResult,
    models::curso::{Curso, NovoCurso},
};
use sqlx::SqliteExecutor;

const COLUNAS: &str =
    "id, nome, professor, data, carga_horaria, certificado, vagas_totais, vagas_preenchidas";

pub async fn listar<'e>(ex: impl SqliteExecutor<'e>) -> AppResult<Vec<Curso>> {
    let sql = format!("SELECT {COLUNAS} FROM cursos ORDER BY id ASC");
    let cursos = sqlx::query_as::<_, Curso>(&sql).fetch_all(ex).await?;
    Ok(cursos)
}

pub async fn buscar_por_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> AppResult<Option<Curso>> {
    let sql = format!("SELECT {COLUNAS} FROM cursos WHERE id = ?1");
    let curso = sqlx::query_as::<_, Curso>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(curso)
}

/// Bloqueia o curso para escrita e devolve o seu estado atual.
///
/// O SQLite não tem `SELECT ... FOR UPDATE`: uma escrita nula sobre a linha
/// obriga a transação a adquirir o lock de escrita da base de dados, que só
/// é libertado no commit/rollback. Tem de ser a primeira instrução da
/// transação, para que nenhuma leitura anterior fique desatualizada.
pub async fn travar<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> AppResult<Option<Curso>> {
    let sql = format!(
        "UPDATE cursos SET vagas_preenchidas = vagas_preenchidas WHERE id = ?1 RETURNING {COLUNAS}"
    );
    let curso = sqlx::query_as::<_, Curso>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(curso)
}

// Um curso novo começa sempre sem vagas ocupadas
pub async fn inserir<'e>(ex: impl SqliteExecutor<'e>, novo: &NovoCurso) -> AppResult<Curso> {
    let sql = format!(
        r#"
        INSERT INTO cursos (nome, professor, data, carga_horaria, certificado, vagas_totais, vagas_preenchidas)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)
        RETURNING {COLUNAS}
        "#
    );
    let curso = sqlx::query_as::<_, Curso>(&sql)
        .bind(&novo.nome)
        .bind(&novo.professor)
        .bind(novo.data)
        .bind(novo.carga_horaria)
        .bind(&novo.certificado)
        .bind(novo.vagas_totais)
        .fetch_one(ex)
        .await?;
    Ok(curso)
}

/// Grava os dados editáveis. `vagas_preenchidas` nunca é escrito aqui, e a
/// linha só muda se o novo total ainda comportar as vagas já ocupadas.
pub async fn atualizar<'e>(ex: impl SqliteExecutor<'e>, curso: &Curso) -> AppResult<u64> {
    let linhas = sqlx::query(
        r#"
        UPDATE cursos
        SET nome = ?1, professor = ?2, data = ?3, carga_horaria = ?4, certificado = ?5, vagas_totais = ?6
        WHERE id = ?7 AND vagas_preenchidas <= ?6
        "#,
    )
    .bind(&curso.nome)
    .bind(&curso.professor)
    .bind(curso.data)
    .bind(curso.carga_horaria)
    .bind(&curso.certificado)
    .bind(curso.vagas_totais)
    .bind(curso.id)
    .execute(ex)
    .await?
    .rows_affected();
    Ok(linhas)
}

/// Ocupa uma vaga. Devolve `false` se o curso já estiver lotado.
pub async fn incrementar_vagas<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> AppResult<bool> {
    // A condição no WHERE faz da verificação e do incremento uma só instrução
    let linhas = sqlx::query(
        r#"
        UPDATE cursos SET vagas_preenchidas = vagas_preenchidas + 1
        WHERE id = ?1 AND vagas_preenchidas < vagas_totais
        "#,
    )
    .bind(id)
    .execute(ex)
    .await?
    .rows_affected();
    Ok(linhas == 1)
}

/// Liberta uma vaga, nunca abaixo de zero.
pub async fn decrementar_vagas<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> AppResult<u64> {
    let linhas = sqlx::query(
        "UPDATE cursos SET vagas_preenchidas = MAX(vagas_preenchidas - 1, 0) WHERE id = ?1",
    )
    .bind(id)
    .execute(ex)
    .await?
    .rows_affected();
    Ok(linhas)
}

// Só é chamado depois de confirmar que o curso não tem inscrições
pub async fn remover<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> AppResult<u64> {
    let linhas = sqlx::query("DELETE FROM cursos WHERE id = ?1")
        .bind(id)
        .execute(ex)
        .await?
        .rows_affected();
    Ok(linhas)
}

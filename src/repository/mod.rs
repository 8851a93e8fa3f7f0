// src/repository/mod.rs
//! Acesso às tabelas. Cada função aceita qualquer executor SQLite, seja a
//! pool ou uma transação aberta (`&mut *tx`).
pub mod aluno_repository;
pub mod curso_repository;
pub mod inscricao_repository;

/// Violação de UNIQUE (ou de chave primária) reportada pelo SQLite.
pub fn eh_violacao_unica(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

pub fn eh_violacao_fk(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

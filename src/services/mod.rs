// src/services/mod.rs
pub mod aluno_service;
pub mod auth_service;
pub mod curso_service;
pub mod inscricao_service;
pub mod relatorio_service;

// src/web/mod.rs
pub mod aluno_handlers;
pub mod auth_handlers;
pub mod curso_handlers;
pub mod extract;
pub mod health_handlers;
pub mod inscricao_handlers;
pub mod mw_admin;
pub mod mw_auth;
pub mod routes;

// src/models/mod.rs
pub mod aluno;
pub mod curso;
pub mod data_br;
pub mod inscricao;

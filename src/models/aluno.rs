// src/models/aluno.rs
use super::data_br;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Representa uma linha da tabela 'alunos'
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Aluno {
    pub id: i64,
    pub nome: String,
    pub cpf: String,
    pub email: String,
    pub sexo: String,
    pub telefone: String,
    #[serde(with = "data_br::opcional")]
    pub data_nascto: Option<NaiveDate>,
}

/// Dados de registo de um aluno novo.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovoAluno {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub sexo: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default, with = "data_br::opcional")]
    pub data_nascto: Option<NaiveDate>,
}

/// Atualização parcial: campo ausente (ou string vazia) mantém o valor atual.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarAluno {
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub sexo: Option<String>,
    pub telefone: Option<String>,
    #[serde(default, with = "data_br::opcional")]
    pub data_nascto: Option<NaiveDate>,
}

// src/models/curso.rs
use super::data_br;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Curso {
    pub id: i64,
    pub nome: String,
    pub professor: String,
    #[serde(with = "data_br::opcional")]
    pub data: Option<NaiveDate>,
    pub carga_horaria: i64,
    pub certificado: String,
    pub vagas_totais: i64,
    pub vagas_preenchidas: i64,
}

impl Curso {
    pub fn vagas_disponiveis(&self) -> i64 {
        (self.vagas_totais - self.vagas_preenchidas).max(0)
    }

    pub fn esta_lotado(&self) -> bool {
        self.vagas_preenchidas >= self.vagas_totais
    }
}

/// Dados de criação. `vagasPreenchidas` não é aceite: começa sempre em zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovoCurso {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub professor: String,
    #[serde(default, with = "data_br::opcional")]
    pub data: Option<NaiveDate>,
    #[serde(default)]
    pub carga_horaria: i64,
    #[serde(default)]
    pub certificado: String,
    #[serde(default)]
    pub vagas_totais: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarCurso {
    pub nome: Option<String>,
    pub professor: Option<String>,
    #[serde(default, with = "data_br::opcional")]
    pub data: Option<NaiveDate>,
    pub carga_horaria: Option<i64>,
    pub certificado: Option<String>,
    pub vagas_totais: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VagasCurso {
    pub curso_id: i64,
    pub vagas_totais: i64,
    pub vagas_preenchidas: i64,
    pub vagas_disponiveis: i64,
}

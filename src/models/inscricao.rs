// src/models/inscricao.rs
use super::{aluno::Aluno, curso::Curso};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Inscricao {
    pub id: i64,
    pub aluno_id: i64,
    pub curso_id: i64,
    pub data_inscricao: DateTime<Utc>,
    pub escolaridade: String,
    pub situacao_trabalho: String,
    pub bairro: String,
    pub eh_cuidador: bool,
    #[serde(rename = "ehPCD")]
    pub eh_pcd: bool,
    #[serde(rename = "tipoPCD")]
    pub tipo_pcd: String,
    pub necessita_elevador: bool,
    pub como_soube: String,
    #[serde(rename = "autorizaWhatsApp")]
    pub autoriza_whatsapp: bool,
    pub leva_notebook: bool,
}

/// Respostas do questionário enviadas junto com a inscrição.
/// Tudo é opcional; os valores em falta ficam com o padrão da tabela.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetalhesInscricao {
    pub data_inscricao: Option<DateTime<Utc>>,
    pub escolaridade: Option<String>,
    pub situacao_trabalho: Option<String>,
    pub bairro: Option<String>,
    pub eh_cuidador: Option<bool>,
    #[serde(rename = "ehPCD")]
    pub eh_pcd: Option<bool>,
    #[serde(rename = "tipoPCD")]
    pub tipo_pcd: Option<String>,
    pub necessita_elevador: Option<bool>,
    pub como_soube: Option<String>,
    #[serde(rename = "autorizaWhatsApp")]
    pub autoriza_whatsapp: Option<bool>,
    pub leva_notebook: Option<bool>,
}

/// Inscrição com o aluno e o curso correspondentes (listagens de admin).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InscricaoDetalhada {
    #[serde(flatten)]
    pub inscricao: Inscricao,
    pub aluno: Aluno,
    pub curso: Curso,
}

/// Pedido público: regista (ou reaproveita) o aluno e inscreve-o no curso.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CadastroInscricao {
    pub aluno: super::aluno::NovoAluno,
    pub curso_id: i64,
    #[serde(default)]
    pub inscricao: DetalhesInscricao,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoInscricao {
    pub aluno: Aluno,
    pub inscricao: Inscricao,
    pub message: String,
}

/// Totais calculados pelo relatório de inscrições.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResumoRelatorio {
    pub total_registros: usize,
    #[serde(rename = "comPCD")]
    pub com_pcd: usize,
    #[serde(rename = "semPCD")]
    pub sem_pcd: usize,
    pub cuidadores: usize,
    pub necessitam_elevador: usize,
    #[serde(rename = "autorizaramWhatsApp")]
    pub autorizaram_whatsapp: usize,
}

/// Inscrição já normalizada, pronta a gravar.
#[derive(Debug, Clone)]
pub struct NovaInscricao {
    pub aluno_id: i64,
    pub curso_id: i64,
    pub data_inscricao: DateTime<Utc>,
    pub escolaridade: String,
    pub situacao_trabalho: String,
    pub bairro: String,
    pub eh_cuidador: bool,
    pub eh_pcd: bool,
    pub tipo_pcd: String,
    pub necessita_elevador: bool,
    pub como_soube: String,
    pub autoriza_whatsapp: bool,
    pub leva_notebook: bool,
}

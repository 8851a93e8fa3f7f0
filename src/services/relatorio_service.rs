// src/services/relatorio_service.rs
use crate::{
    error::{AppError, AppResult},
    models::inscricao::ResumoRelatorio,
};
use serde_json::{Map, Value};

/// `true`, `"sim"` ou `"S"` (sem distinguir maiúsculas).
fn marcado(registo: &Map<String, Value>, chave: &str) -> bool {
    match registo.get(chave) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("sim") || s.eq_ignore_ascii_case("s")
        }
        _ => false,
    }
}

/// Resume as linhas exportadas pelo painel de inscrições.
pub fn gerar_relatorio(registos: &[Map<String, Value>]) -> AppResult<ResumoRelatorio> {
    if registos.is_empty() {
        return Err(AppError::Validation("Nenhum dado fornecido para gerar relatório".into()));
    }
    tracing::info!("Gerando relatório com {} registos", registos.len());

    let mut resumo = ResumoRelatorio {
        total_registros: registos.len(),
        ..Default::default()
    };
    for registo in registos {
        if marcado(registo, "ehPCD") {
            resumo.com_pcd += 1;
        } else {
            resumo.sem_pcd += 1;
        }
        if marcado(registo, "ehCuidador") {
            resumo.cuidadores += 1;
        }
        if marcado(registo, "necessitaElevador") {
            resumo.necessitam_elevador += 1;
        }
        if marcado(registo, "autorizaWhatsApp") {
            resumo.autorizaram_whatsapp += 1;
        }
    }

    tracing::info!(
        "Resumo do relatório: {} PCDs, {} cuidadores, {} necessitam de elevador, {} autorizaram WhatsApp",
        resumo.com_pcd,
        resumo.cuidadores,
        resumo.necessitam_elevador,
        resumo.autorizaram_whatsapp
    );
    Ok(resumo)
}

// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, str::FromStr, time::Duration};

const ADMIN_PASSWORD_PADRAO: &str = "admin123";
const JWT_SECRET_PADRAO: &str = "chave-secreta-padrao-mudar-em-producao";

/// O que acontece a um aluno removido que ainda tem inscrições.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoliticaRemocaoAluno {
    /// Recusa a remoção enquanto houver inscrições.
    Rejeitar,
    /// Cancela todas as inscrições (libertando as vagas) e remove o aluno.
    Cascata,
}

impl FromStr for PoliticaRemocaoAluno {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rejeitar" => Ok(Self::Rejeitar),
            "cascata" => Ok(Self::Cascata),
            outro => Err(AppError::Config(format!(
                "ALUNO_REMOCAO_POLITICA inválida: '{}' (use 'rejeitar' ou 'cascata')",
                outro
            ))),
        }
    }
}

/// Credenciais do administrador e parâmetros do JWT.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub admin_username: String,
    pub admin_password: String,
    pub jwt_secret: String,
    pub token_validade: chrono::Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub tx_tentativas: u32,
    pub politica_remocao_aluno: PoliticaRemocaoAluno,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        let port = parse_var("PORT", 8080u16)?;
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/tvtec.db".to_string());

        let admin_username = var_ou_padrao("ADMIN_USERNAME", "admin");
        let admin_password = var_ou_padrao("ADMIN_PASSWORD", ADMIN_PASSWORD_PADRAO);
        let jwt_secret = var_ou_padrao("JWT_SECRET_KEY", JWT_SECRET_PADRAO);
        let horas: i64 = parse_var("TOKEN_VALIDADE_HORAS", 24)?;

        if admin_password == ADMIN_PASSWORD_PADRAO {
            tracing::warn!("⚠️ Senha de administrador padrão em uso! Defina ADMIN_PASSWORD.");
        }
        if jwt_secret == JWT_SECRET_PADRAO {
            tracing::warn!("⚠️ Chave JWT padrão em uso! Defina JWT_SECRET_KEY.");
        }

        let tx_tentativas: u32 = parse_var("DB_TX_TENTATIVAS", 3)?;
        if tx_tentativas == 0 {
            return Err(AppError::Config("DB_TX_TENTATIVAS deve ser pelo menos 1".into()));
        }

        let politica_remocao_aluno = env::var("ALUNO_REMOCAO_POLITICA")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(PoliticaRemocaoAluno::Rejeitar);

        let timeout_secs: u64 = parse_var("REQUEST_TIMEOUT_SECS", 30)?;

        Ok(Self {
            port,
            database_url,
            auth: AuthConfig {
                admin_username,
                admin_password,
                jwt_secret,
                token_validade: chrono::Duration::hours(horas),
            },
            tx_tentativas,
            politica_remocao_aluno,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn var_ou_padrao(chave: &str, padrao: &str) -> String {
    env::var(chave)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| padrao.to_string())
}

fn parse_var<T: FromStr>(chave: &str, padrao: T) -> AppResult<T> {
    match env::var(chave) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} inválida: '{}'", chave, v))),
        _ => Ok(padrao),
    }
}

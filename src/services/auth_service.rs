// src/services/auth_service.rs
use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";

/// Conteúdo do JWT emitido no login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn eh_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Verifica se a senha fornecida corresponde ao hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &stored_hash))
        .await
        .map_err(|e| {
            tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
            AppError::InternalServerError
        })?
        .map_err(|e| {
            tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
            AppError::PasswordHashingError
        })
}

/// Gera um hash bcrypt para uma senha.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| {
            tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
            AppError::InternalServerError
        })?
        .map_err(|e| {
            tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
            AppError::PasswordHashingError
        })
}

/// Login do administrador e emissão/validação de tokens.
///
/// A senha configurada só existe em memória como hash bcrypt.
pub struct Autenticador {
    admin_username: String,
    admin_password_hash: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_validade: chrono::Duration,
}

impl Autenticador {
    pub async fn new(config: &AuthConfig) -> AppResult<Self> {
        let hash = hash_password(&config.admin_password).await?;
        tracing::info!("Autenticação configurada para o utilizador '{}'.", config.admin_username);
        Ok(Self::com_hash(config, hash))
    }

    /// Constrói a partir de um hash já calculado.
    pub fn com_hash(config: &AuthConfig, admin_password_hash: String) -> Self {
        Self {
            admin_username: config.admin_username.clone(),
            admin_password_hash,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_validade: config.token_validade,
        }
    }

    /// Devolve um token de administrador ou `InvalidCredentials`.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, Claims)> {
        // Verifica sempre o hash, mesmo com utilizador errado
        let senha_ok = verify_password(password, &self.admin_password_hash).await?;
        if username != self.admin_username || !senha_ok {
            tracing::warn!("Tentativa de login falhada para '{}'", username);
            return Err(AppError::InvalidCredentials);
        }

        let (token, claims) = self.emitir_token(username, ROLE_ADMIN)?;
        tracing::info!("✅ Login de '{}' bem-sucedido.", username);
        Ok((token, claims))
    }

    pub fn emitir_token(&self, username: &str, role: &str) -> AppResult<(String, Claims)> {
        let agora = Utc::now();
        let claims = Claims {
            username: username.to_string(),
            role: role.to_string(),
            iat: agora.timestamp(),
            exp: (agora + self.token_validade).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok((token, claims))
    }

    pub fn validar_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|dados| dados.claims)
            .map_err(|e| {
                tracing::debug!("Token rejeitado: {}", e);
                AppError::Unauthorized("Token inválido ou expirado".into())
            })
    }
}

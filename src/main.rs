// src/main.rs

// --- Declaração dos Módulos ---
mod config;
mod db;
mod error;
mod models;
mod repository;
mod services;
mod state;
mod web;

// --- Imports ---
use crate::{config::Config, services::auth_service::Autenticador, state::AppState};
use axum::{extract::Request, serve, ServiceExt};
use std::{env, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuração do Logging (Tracing) ---
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                env::var("RUST_LOG")
                    .unwrap_or_else(|_| "tvtec=debug,tower_http=info,sqlx=warn".into())
                    .into()
            }),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Iniciando servidor TVTec...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuração inválida: {}", e);
            return Err(anyhow::anyhow!("Falha ao ler configuração: {}", e));
        }
    };

    // --- Configuração da Base de Dados ---
    let db_pool = match db::create_db_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Falha crítica ao inicializar a base de dados: {}", e);
            return Err(anyhow::anyhow!("Falha ao conectar/migrar DB: {}", e));
        }
    };

    let autenticador = Autenticador::new(&config.auth)
        .await
        .map_err(|e| anyhow::anyhow!("Falha ao configurar autenticação: {}", e))?;
    tracing::info!(
        "🔑 Autenticação pronta (tokens válidos por {}h). Política de remoção de alunos: {:?}.",
        config.auth.token_validade.num_hours(),
        config.politica_remocao_aluno
    );

    let port = config.port;
    let app_state = AppState {
        db_pool,
        autenticador: Arc::new(autenticador),
        config: Arc::new(config),
    };

    // --- Configuração do Endereço e Listener ---
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Falha ao iniciar listener na porta {}: {}", port, e);
            return Err(e.into());
        }
    };
    tracing::info!("📡 Servidor escutando em http://{}", addr);

    // --- Criação do Router e Aplicação das Camadas (Middlewares) ---
    let app = web::routes::create_app(app_state);
    tracing::info!("✅ Router e middlewares configurados.");

    // --- Início do Servidor ---
    if let Err(e) = serve(listener, ServiceExt::<Request>::into_make_service(app)).await {
        tracing::error!("❌ Erro fatal no servidor: {}", e);
        return Err(e.into());
    }

    Ok(())
}

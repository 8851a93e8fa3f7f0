// src/db.rs
use crate::error::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub async fn create_db_pool(database_url: &str) -> AppResult<SqlitePool> {
    tracing::info!("Ligando à base de dados: {}", database_url);
    garantir_diretorio(database_url)?;

    // Opções de conexão (criar se não existir, esperar por locks, FKs ligadas)
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("Executando migrações da base de dados...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrações concluídas.");

    Ok(pool)
}

fn garantir_diretorio(database_url: &str) -> AppResult<()> {
    let Some(resto) = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };
    let ficheiro = resto.split('?').next().unwrap_or(resto);
    if ficheiro.is_empty() || ficheiro == ":memory:" {
        return Ok(());
    }
    if let Some(pai) = Path::new(ficheiro).parent() {
        if !pai.as_os_str().is_empty() {
            std::fs::create_dir_all(pai).map_err(|e| {
                AppError::Config(format!("Não foi possível criar {}: {}", pai.display(), e))
            })?;
        }
    }
    Ok(())
}

/// SQLITE_BUSY / SQLITE_LOCKED e os seus códigos estendidos.
fn eh_contencao(err: &AppError) -> bool {
    match err {
        AppError::SqlxError(sqlx::Error::Database(db_err)) => db_err
            .code()
            .and_then(|c| c.parse::<i32>().ok())
            .is_some_and(|c| matches!(c & 0xff, 5 | 6)),
        _ => false,
    }
}

/// Executa uma transação, repetindo-a enquanto a base de dados estiver ocupada.
///
/// Erros de negócio são devolvidos de imediato. Depois de `tentativas`
/// falhas por contenção devolve `AppError::Transient`.
pub async fn com_retentativa<T, F, Fut>(tentativas: u32, mut operacao: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut tentativa = 1;
    loop {
        match operacao().await {
            Err(e) if eh_contencao(&e) => {
                if tentativa >= tentativas {
                    tracing::error!("Transação abortada após {} tentativas: {:?}", tentativa, e);
                    return Err(AppError::Transient);
                }
                tracing::warn!("Base de dados ocupada (tentativa {}), repetindo...", tentativa);
                tokio::time::sleep(Duration::from_millis(25 * u64::from(tentativa))).await;
                tentativa += 1;
            }
            resultado => return resultado,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::{Connection, SqliteConnection};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retentativa_devolve_erro_de_negocio_sem_repetir() {
        let chamadas = AtomicU32::new(0);
        let resultado: AppResult<()> = com_retentativa(3, || async {
            chamadas.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Validation("x".into()))
        })
        .await;

        assert!(matches!(resultado, Err(AppError::Validation(_))));
        assert_eq!(chamadas.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retentativa_devolve_sucesso() {
        let resultado = com_retentativa(3, || async { Ok::<_, AppError>(7) }).await;
        assert_eq!(resultado.unwrap(), 7);
    }

    #[tokio::test]
    async fn base_de_teste_tem_tabelas_e_e_apagada_no_drop() {
        let base = testes::BaseDeTeste::nova().await;
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('alunos', 'cursos', 'inscricoes')",
        )
        .fetch_one(&base.pool)
        .await
        .unwrap();
        assert_eq!(total, 3);

        let caminho = base.url.trim_start_matches("sqlite://").to_string();
        base.pool.close().await;
        drop(base);
        assert!(!Path::new(&caminho).exists());
    }

    #[tokio::test]
    async fn retentativa_esgota_com_base_ocupada() {
        let base = testes::BaseDeTeste::nova().await;

        // Outra conexão fica com o lock de escrita durante todo o teste
        let mut dono = base.pool.acquire().await.unwrap();
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *dono).await.unwrap();

        let opcoes = SqliteConnectOptions::from_str(&base.url)
            .unwrap()
            .busy_timeout(Duration::ZERO);
        let chamadas = AtomicU32::new(0);
        let resultado: AppResult<()> = com_retentativa(3, || async {
            chamadas.fetch_add(1, Ordering::SeqCst);
            let mut conn = SqliteConnection::connect_with(&opcoes).await?;
            sqlx::query("BEGIN IMMEDIATE").execute(&mut conn).await?;
            Ok::<(), AppError>(())
        })
        .await;

        assert!(matches!(resultado, Err(AppError::Transient)), "{resultado:?}");
        assert_eq!(chamadas.load(Ordering::SeqCst), 3);

        sqlx::query("ROLLBACK").execute(&mut *dono).await.unwrap();
    }
}

// src/services/inscricao_service.rs
//! Inscrições e contabilidade de vagas.
//!
//! Toda a alteração de `vagas_preenchidas` passa por uma transação que começa
//! com `curso_repository::travar`, por isso duas inscrições concorrentes nunca
//! leem o mesmo contador.
use crate::{
    db,
    error::{AppError, AppResult},
    models::{
        aluno::Aluno,
        curso::Curso,
        inscricao::{
            CadastroInscricao, DetalhesInscricao, Inscricao, InscricaoDetalhada, NovaInscricao,
            ResultadoInscricao,
        },
    },
    repository::{self, aluno_repository, curso_repository, inscricao_repository},
    services::{aluno_service, curso_service},
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;

pub fn validar_detalhes(detalhes: &DetalhesInscricao) -> AppResult<()> {
    let tipo_vazio = detalhes
        .tipo_pcd
        .as_deref()
        .map_or(true, |t| t.trim().is_empty());
    if detalhes.eh_pcd == Some(true) && tipo_vazio {
        return Err(AppError::Validation(
            "Quando marcado como PCD, o tipo de deficiência deve ser informado".into(),
        ));
    }
    Ok(())
}

fn texto(valor: &Option<String>) -> String {
    valor.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn normalizar(aluno_id: i64, curso_id: i64, detalhes: &DetalhesInscricao) -> NovaInscricao {
    NovaInscricao {
        aluno_id,
        curso_id,
        data_inscricao: detalhes.data_inscricao.unwrap_or_else(Utc::now),
        escolaridade: texto(&detalhes.escolaridade),
        situacao_trabalho: texto(&detalhes.situacao_trabalho),
        bairro: texto(&detalhes.bairro),
        eh_cuidador: detalhes.eh_cuidador.unwrap_or(false),
        eh_pcd: detalhes.eh_pcd.unwrap_or(false),
        tipo_pcd: texto(&detalhes.tipo_pcd),
        necessita_elevador: detalhes.necessita_elevador.unwrap_or(false),
        como_soube: texto(&detalhes.como_soube),
        autoriza_whatsapp: detalhes.autoriza_whatsapp.unwrap_or(false),
        leva_notebook: detalhes.leva_notebook.unwrap_or(false),
    }
}

/// Passos 2 a 5 da inscrição, com o curso já travado na transação `conn`.
async fn inscrever_no_curso(
    conn: &mut SqliteConnection,
    curso: &Curso,
    aluno_id: i64,
    detalhes: &DetalhesInscricao,
) -> AppResult<Inscricao> {
    if curso.esta_lotado() {
        return Err(AppError::CapacityExceeded(format!(
            "Não há vagas disponíveis para o curso {}",
            curso.nome
        )));
    }

    if inscricao_repository::buscar_por_aluno_e_curso(&mut *conn, aluno_id, curso.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!("Aluno já inscrito no curso {}", curso.nome)));
    }

    let nova = normalizar(aluno_id, curso.id, detalhes);
    let inscricao = match inscricao_repository::inserir(&mut *conn, &nova).await {
        Err(AppError::SqlxError(e)) if repository::eh_violacao_unica(&e) => {
            return Err(AppError::Conflict(format!("Aluno já inscrito no curso {}", curso.nome)))
        }
        resultado => resultado?,
    };

    if !curso_repository::incrementar_vagas(&mut *conn, curso.id).await? {
        // Com o lock isto não deve acontecer; o rollback desfaz o insert
        return Err(AppError::CapacityExceeded(format!(
            "Não há vagas disponíveis para o curso {}",
            curso.nome
        )));
    }

    Ok(inscricao)
}

async fn tentar_inscrever(
    db_pool: &SqlitePool,
    aluno_id: i64,
    curso_id: i64,
    detalhes: &DetalhesInscricao,
) -> AppResult<Inscricao> {
    let mut tx = db_pool.begin().await?;

    let curso = curso_service::travar_curso(&mut tx, curso_id).await?;
    if aluno_repository::buscar_por_id(&mut *tx, aluno_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Aluno não encontrado com o id {}", aluno_id)));
    }
    let inscricao = inscrever_no_curso(&mut tx, &curso, aluno_id, detalhes).await?;

    tx.commit().await?;
    tracing::info!("✅ Aluno {} inscrito no curso {} ({}).", aluno_id, curso.id, curso.nome);
    Ok(inscricao)
}

/// Inscreve um aluno já existente.
pub async fn inscrever_aluno(
    db_pool: &SqlitePool,
    tentativas: u32,
    aluno_id: i64,
    curso_id: i64,
    detalhes: DetalhesInscricao,
) -> AppResult<Inscricao> {
    validar_detalhes(&detalhes)?;
    tracing::debug!("Inscrevendo aluno {} no curso {}", aluno_id, curso_id);

    let detalhes = &detalhes;
    db::com_retentativa(tentativas, move || {
        tentar_inscrever(db_pool, aluno_id, curso_id, detalhes)
    })
    .await
}

async fn tentar_cadastro(db_pool: &SqlitePool, pedido: &CadastroInscricao) -> AppResult<(Aluno, Inscricao)> {
    let mut tx = db_pool.begin().await?;

    let curso = curso_service::travar_curso(&mut tx, pedido.curso_id).await?;

    let existente = match aluno_repository::buscar_por_email(&mut *tx, &pedido.aluno.email).await? {
        Some(aluno) => Some(aluno),
        None => aluno_repository::buscar_por_cpf(&mut *tx, &pedido.aluno.cpf).await?,
    };
    let aluno = match existente {
        Some(aluno) => {
            tracing::debug!("Reaproveitando aluno {} ({})", aluno.id, aluno.email);
            aluno
        }
        None => aluno_service::criar_aluno_em(&mut tx, &pedido.aluno).await?,
    };

    // Se falhar aqui o aluno recém-criado também é desfeito
    let inscricao = inscrever_no_curso(&mut tx, &curso, aluno.id, &pedido.inscricao).await?;

    tx.commit().await?;
    tracing::info!("✅ Aluno {} cadastrado e inscrito no curso {}.", aluno.nome, curso.nome);
    Ok((aluno, inscricao))
}

/// Inscrição pública: cria ou reaproveita o aluno e inscreve-o, tudo na mesma transação.
pub async fn cadastrar_e_inscrever(
    db_pool: &SqlitePool,
    tentativas: u32,
    pedido: CadastroInscricao,
) -> AppResult<ResultadoInscricao> {
    let pedido = CadastroInscricao {
        aluno: aluno_service::validar_novo_aluno(&pedido.aluno)?,
        ..pedido
    };
    validar_detalhes(&pedido.inscricao)?;

    let pedido = &pedido;
    let (aluno, inscricao) =
        db::com_retentativa(tentativas, move || tentar_cadastro(db_pool, pedido)).await?;

    Ok(ResultadoInscricao {
        aluno,
        inscricao,
        message: "Aluno cadastrado e inscrito no curso com sucesso".into(),
    })
}

async fn tentar_cancelar(db_pool: &SqlitePool, id: i64) -> AppResult<i64> {
    let mut tx = db_pool.begin().await?;

    // O DELETE é a primeira escrita: a partir daqui a transação detém o lock
    let curso_id = inscricao_repository::remover(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Inscrição não encontrada com o id {}", id)))?;
    curso_repository::decrementar_vagas(&mut *tx, curso_id).await?;

    tx.commit().await?;
    Ok(curso_id)
}

/// Cancela a inscrição e liberta a vaga.
pub async fn cancelar_inscricao(db_pool: &SqlitePool, tentativas: u32, id: i64) -> AppResult<()> {
    let curso_id = db::com_retentativa(tentativas, || tentar_cancelar(db_pool, id)).await?;
    tracing::info!("✅ Inscrição {} cancelada; vaga libertada no curso {}.", id, curso_id);
    Ok(())
}

pub async fn listar_inscricoes_detalhadas(db_pool: &SqlitePool) -> AppResult<Vec<InscricaoDetalhada>> {
    let inscricoes = inscricao_repository::listar(db_pool).await?;
    let alunos: HashMap<i64, Aluno> = aluno_repository::listar(db_pool)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
    let cursos: HashMap<i64, Curso> = curso_repository::listar(db_pool)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let detalhadas: Vec<InscricaoDetalhada> = inscricoes
        .into_iter()
        .filter_map(|inscricao| {
            let aluno = alunos.get(&inscricao.aluno_id)?.clone();
            let curso = cursos.get(&inscricao.curso_id)?.clone();
            Some(InscricaoDetalhada { inscricao, aluno, curso })
        })
        .collect();

    tracing::debug!("Encontradas {} inscrições.", detalhadas.len());
    Ok(detalhadas)
}

pub async fn obter_inscricao_detalhada(db_pool: &SqlitePool, id: i64) -> AppResult<InscricaoDetalhada> {
    let nao_encontrada = || AppError::NotFound(format!("Inscrição não encontrada com o id {}", id));

    let inscricao = inscricao_repository::buscar_por_id(db_pool, id)
        .await?
        .ok_or_else(nao_encontrada)?;
    let aluno = aluno_repository::buscar_por_id(db_pool, inscricao.aluno_id)
        .await?
        .ok_or_else(nao_encontrada)?;
    let curso = curso_repository::buscar_por_id(db_pool, inscricao.curso_id)
        .await?
        .ok_or_else(nao_encontrada)?;

    Ok(InscricaoDetalhada { inscricao, aluno, curso })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::testes::BaseDeTeste,
        models::{aluno::NovoAluno, curso::NovoCurso},
        services::curso_service,
    };

    fn novo_aluno(n: u32) -> NovoAluno {
        NovoAluno {
            nome: format!("Aluno {n}"),
            cpf: format!("000.000.000-{n:02}"),
            email: format!("aluno{n}@exemplo.com"),
            ..Default::default()
        }
    }

    async fn criar_curso(pool: &SqlitePool, vagas: i64) -> Curso {
        curso_service::criar_curso(
            pool,
            NovoCurso {
                nome: "Programação Web".into(),
                professor: "Ana".into(),
                carga_horaria: 40,
                vagas_totais: vagas,
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    async fn criar_aluno(pool: &SqlitePool, n: u32) -> Aluno {
        aluno_service::criar_aluno(pool, novo_aluno(n)).await.unwrap()
    }

    async fn preenchidas(pool: &SqlitePool, curso_id: i64) -> i64 {
        curso_service::obter_curso(pool, curso_id).await.unwrap().vagas_preenchidas
    }

    #[tokio::test]
    async fn ciclo_completo_com_uma_vaga() {
        let base = BaseDeTeste::nova().await;
        let pool = base.pool.clone();
        let curso = criar_curso(&pool, 1).await;
        let a = criar_aluno(&pool, 1).await;
        let b = criar_aluno(&pool, 2).await;

        let inscricao_a = inscrever_aluno(&pool, 3, a.id, curso.id, DetalhesInscricao::default())
            .await
            .unwrap();
        assert_eq!(preenchidas(&pool, curso.id).await, 1);

        let erro = inscrever_aluno(&pool, 3, b.id, curso.id, DetalhesInscricao::default())
            .await
            .unwrap_err();
        assert!(matches!(erro, AppError::CapacityExceeded(_)), "{erro:?}");
        assert_eq!(preenchidas(&pool, curso.id).await, 1);

        cancelar_inscricao(&pool, 3, inscricao_a.id).await.unwrap();
        assert_eq!(preenchidas(&pool, curso.id).await, 0);

        inscrever_aluno(&pool, 3, b.id, curso.id, DetalhesInscricao::default())
            .await
            .unwrap();
        assert_eq!(preenchidas(&pool, curso.id).await, 1);
    }

    #[tokio::test]
    async fn inscrever_duas_vezes_e_conflito() {
        let base = BaseDeTeste::nova().await;
        let pool = base.pool.clone();
        let curso = criar_curso(&pool, 3).await;
        let aluno = criar_aluno(&pool, 1).await;

        let primeira = inscrever_aluno(&pool, 3, aluno.id, curso.id, DetalhesInscricao::default())
            .await
            .unwrap();
        let erro = inscrever_aluno(&pool, 3, aluno.id, curso.id, DetalhesInscricao::default())
            .await
            .unwrap_err();

        assert!(matches!(erro, AppError::Conflict(_)));
        assert_eq!(preenchidas(&pool, curso.id).await, 1);
        let inscricoes = inscricao_repository::listar_por_curso(&pool, curso.id).await.unwrap();
        assert_eq!(inscricoes, vec![primeira]);
    }

    #[tokio::test]
    async fn curso_ou_aluno_inexistente() {
        let base = BaseDeTeste::nova().await;
        let pool = base.pool.clone();
        let curso = criar_curso(&pool, 2).await;
        let aluno = criar_aluno(&pool, 1).await;

        let sem_curso = inscrever_aluno(&pool, 3, aluno.id, 999, DetalhesInscricao::default()).await;
        let sem_aluno = inscrever_aluno(&pool, 3, 999, curso.id, DetalhesInscricao::default()).await;

        assert!(matches!(sem_curso, Err(AppError::NotFound(_))));
        assert!(matches!(sem_aluno, Err(AppError::NotFound(_))));
        assert_eq!(preenchidas(&pool, curso.id).await, 0);
    }

    #[tokio::test]
    async fn cancelar_inexistente() {
        let base = BaseDeTeste::nova().await;
        let pool = base.pool.clone();
        assert!(matches!(cancelar_inscricao(&pool, 3, 7).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn cancelar_com_contador_a_zero_nao_fica_negativo() {
        let base = BaseDeTeste::nova().await;
        let pool = base.pool.clone();
        let curso = criar_curso(&pool, 2).await;
        let aluno = criar_aluno(&pool, 1).await;
        let inscricao = inscrever_aluno(&pool, 3, aluno.id, curso.id, DetalhesInscricao::default())
            .await
            .unwrap();

        // Contador dessincronizado da tabela de inscrições
        sqlx::query("UPDATE cursos SET vagas_preenchidas = 0 WHERE id = ?1")
            .bind(curso.id)
            .execute(&pool)
            .await
            .unwrap();

        cancelar_inscricao(&pool, 3, inscricao.id).await.unwrap();
        assert_eq!(preenchidas(&pool, curso.id).await, 0);
        assert!(inscricao_repository::listar_por_curso(&pool, curso.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pcd_exige_tipo() {
        let base = BaseDeTeste::nova().await;
        let pool = base.pool.clone();
        let curso = criar_curso(&pool, 2).await;
        let aluno = criar_aluno(&pool, 1).await;
        let detalhes = DetalhesInscricao {
            eh_pcd: Some(true),
            tipo_pcd: Some("  ".into()),
            ..Default::default()
        };

        let erro = inscrever_aluno(&pool, 3, aluno.id, curso.id, detalhes).await.unwrap_err();
        assert!(matches!(erro, AppError::Validation(_)));
        assert_eq!(preenchidas(&pool, curso.id).await, 0);
    }

    #[tokio::test]
    async fn detalhes_sao_gravados_com_padroes() {
        let base = BaseDeTeste::nova().await;
        let pool = base.pool.clone();
        let curso = criar_curso(&pool, 2).await;
        let aluno = criar_aluno(&pool, 1).await;
        let detalhes = DetalhesInscricao {
            bairro: Some(" Centro ".into()),
            eh_pcd: Some(true),
            tipo_pcd: Some("Visual".into()),
            necessita_elevador: Some(true),
            ..Default::default()
        };

        let inscricao = inscrever_aluno(&pool, 3, aluno.id, curso.id, detalhes).await.unwrap();
        assert_eq!(inscricao.bairro, "Centro");
        assert!(inscricao.eh_pcd && inscricao.necessita_elevador);
        assert!(!inscricao.autoriza_whatsapp && !inscricao.eh_cuidador);
        assert_eq!(inscricao.escolaridade, "");
    }

    #[tokio::test]
    async fn inscricoes_concorrentes_na_ultima_vaga() {
        let base = BaseDeTeste::nova().await;
        let pool = base.pool.clone();
        let curso = criar_curso(&pool, 1).await;
        let mut alunos = Vec::new();
        for n in 0..8 {
            alunos.push(criar_aluno(&pool, n).await.id);
        }

        let tarefas: Vec<_> = alunos
            .into_iter()
            .map(|aluno_id| {
                let pool = pool.clone();
                let curso_id = curso.id;
                tokio::spawn(async move {
                    inscrever_aluno(&pool, 10, aluno_id, curso_id, DetalhesInscricao::default()).await
                })
            })
            .collect();

        let mut sucessos = 0;
        for tarefa in tarefas {
            match tarefa.await.unwrap() {
                Ok(_) => sucessos += 1,
                Err(AppError::CapacityExceeded(_)) => {}
                Err(outro) => panic!("erro inesperado: {outro:?}"),
            }
        }

        assert_eq!(sucessos, 1);
        assert_eq!(preenchidas(&pool, curso.id).await, 1);
        assert_eq!(inscricao_repository::contar_por_curso(&pool, curso.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn cadastro_publico_reaproveita_aluno_pelo_email() {
        let base = BaseDeTeste::nova().await;
        let pool = base.pool.clone();
        let curso_a = criar_curso(&pool, 2).await;
        let curso_b = criar_curso(&pool, 2).await;
        let existente = criar_aluno(&pool, 1).await;

        let mut aluno = novo_aluno(1);
        aluno.cpf = "outro-cpf".into();
        aluno.email = aluno.email.to_uppercase();
        let resultado = cadastrar_e_inscrever(
            &pool,
            3,
            CadastroInscricao { aluno, curso_id: curso_a.id, inscricao: DetalhesInscricao::default() },
        )
        .await
        .unwrap();
        assert_eq!(resultado.aluno, existente);

        // Sem email conhecido, cai para o CPF
        let mut aluno = novo_aluno(1);
        aluno.email = "novo@exemplo.com".into();
        let resultado = cadastrar_e_inscrever(
            &pool,
            3,
            CadastroInscricao { aluno, curso_id: curso_b.id, inscricao: DetalhesInscricao::default() },
        )
        .await
        .unwrap();
        assert_eq!(resultado.aluno.id, existente.id);
        assert_eq!(aluno_service::listar_alunos(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cadastro_publico_em_curso_lotado_nao_cria_aluno() {
        let base = BaseDeTeste::nova().await;
        let pool = base.pool.clone();
        let curso = criar_curso(&pool, 1).await;
        let primeiro = criar_aluno(&pool, 1).await;
        inscrever_aluno(&pool, 3, primeiro.id, curso.id, DetalhesInscricao::default())
            .await
            .unwrap();

        let erro = cadastrar_e_inscrever(
            &pool,
            3,
            CadastroInscricao {
                aluno: novo_aluno(2),
                curso_id: curso.id,
                inscricao: DetalhesInscricao::default(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(erro, AppError::CapacityExceeded(_)));
        assert_eq!(aluno_service::listar_alunos(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listagem_detalhada_junta_aluno_e_curso() {
        let base = BaseDeTeste::nova().await;
        let pool = base.pool.clone();
        let curso = criar_curso(&pool, 2).await;
        let aluno = criar_aluno(&pool, 1).await;
        let inscricao = inscrever_aluno(&pool, 3, aluno.id, curso.id, DetalhesInscricao::default())
            .await
            .unwrap();

        let todas = listar_inscricoes_detalhadas(&pool).await.unwrap();
        assert_eq!(todas.len(), 1);
        assert_eq!(todas[0].aluno, aluno);
        assert_eq!(todas[0].curso.vagas_preenchidas, 1);

        let uma = obter_inscricao_detalhada(&pool, inscricao.id).await.unwrap();
        assert_eq!(uma.inscricao, inscricao);
        assert!(matches!(
            obter_inscricao_detalhada(&pool, inscricao.id + 1).await,
            Err(AppError::NotFound(_))
        ));
    }
}

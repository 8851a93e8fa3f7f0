// src/services/curso_service.rs
use crate::{
    db,
    error::{AppError, AppResult},
    models::{
        curso::{AtualizarCurso, Curso, NovoCurso, VagasCurso},
        inscricao::Inscricao,
    },
    repository::{self, curso_repository, inscricao_repository},
};
use sqlx::{SqliteConnection, SqlitePool};

fn validar_numeros(carga_horaria: i64, vagas_totais: i64) -> AppResult<()> {
    if carga_horaria <= 0 {
        return Err(AppError::Validation("A carga horária deve ser maior que zero".into()));
    }
    if vagas_totais <= 0 {
        return Err(AppError::Validation("O número de vagas totais deve ser maior que zero".into()));
    }
    Ok(())
}

pub async fn criar_curso(db_pool: &SqlitePool, novo: NovoCurso) -> AppResult<Curso> {
    let novo = NovoCurso {
        nome: novo.nome.trim().to_string(),
        professor: novo.professor.trim().to_string(),
        certificado: novo.certificado.trim().to_string(),
        ..novo
    };
    if novo.nome.is_empty() || novo.professor.is_empty() {
        return Err(AppError::Validation("Nome e professor do curso são obrigatórios".into()));
    }
    validar_numeros(novo.carga_horaria, novo.vagas_totais)?;

    let curso = curso_repository::inserir(db_pool, &novo).await?;
    tracing::info!("✅ Curso '{}' criado com id {} ({} vagas).", curso.nome, curso.id, curso.vagas_totais);
    Ok(curso)
}

pub async fn listar_cursos(db_pool: &SqlitePool) -> AppResult<Vec<Curso>> {
    curso_repository::listar(db_pool).await
}

pub async fn obter_curso(db_pool: &SqlitePool, id: i64) -> AppResult<Curso> {
    curso_repository::buscar_por_id(db_pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Curso não encontrado com o id {}", id)))
}

/// Trava o curso na transação `conn` e devolve-o.
/// Tem de ser a primeira instrução de qualquer transação que mexa nas vagas.
pub(crate) async fn travar_curso(conn: &mut SqliteConnection, curso_id: i64) -> AppResult<Curso> {
    curso_repository::travar(conn, curso_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Curso não encontrado com o id {}", curso_id)))
}

fn aplicar(campo: &mut String, novo: &Option<String>) {
    if let Some(valor) = novo.as_deref().map(str::trim) {
        if !valor.is_empty() {
            *campo = valor.to_string();
        }
    }
}

async fn tentar_atualizar(db_pool: &SqlitePool, id: i64, dados: &AtualizarCurso) -> AppResult<Curso> {
    let mut tx = db_pool.begin().await?;
    let mut curso = travar_curso(&mut tx, id).await?;

    aplicar(&mut curso.nome, &dados.nome);
    aplicar(&mut curso.professor, &dados.professor);
    aplicar(&mut curso.certificado, &dados.certificado);
    if dados.data.is_some() {
        curso.data = dados.data;
    }
    if let Some(carga) = dados.carga_horaria {
        curso.carga_horaria = carga;
    }
    if let Some(vagas) = dados.vagas_totais {
        curso.vagas_totais = vagas;
    }

    validar_numeros(curso.carga_horaria, curso.vagas_totais)?;
    if curso.vagas_totais < curso.vagas_preenchidas {
        return Err(AppError::Validation(
            "O número de vagas totais não pode ser menor que o número de vagas já preenchidas".into(),
        ));
    }

    if curso_repository::atualizar(&mut *tx, &curso).await? == 0 {
        return Err(AppError::Validation(
            "O número de vagas totais não pode ser menor que o número de vagas já preenchidas".into(),
        ));
    }

    tx.commit().await?;
    Ok(curso)
}

/// Atualização parcial. Corre com o curso travado para que o novo total seja
/// comparado com o número de vagas realmente ocupadas.
pub async fn atualizar_curso(
    db_pool: &SqlitePool,
    tentativas: u32,
    id: i64,
    dados: AtualizarCurso,
) -> AppResult<Curso> {
    tracing::info!("Atualizando curso {}", id);
    let dados = &dados;
    let curso = db::com_retentativa(tentativas, move || tentar_atualizar(db_pool, id, dados)).await?;
    tracing::info!("✅ Curso {} atualizado.", id);
    Ok(curso)
}

/// Só remove cursos sem inscrições.
pub async fn remover_curso(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    match curso_repository::remover(db_pool, id).await {
        Ok(0) => Err(AppError::NotFound(format!("Curso não encontrado com o id {}", id))),
        Ok(_) => {
            tracing::info!("✅ Curso {} removido.", id);
            Ok(())
        }
        Err(AppError::SqlxError(e)) if repository::eh_violacao_fk(&e) => {
            let total = inscricao_repository::contar_por_curso(db_pool, id).await?;
            Err(AppError::Conflict(format!(
                "O curso possui {} inscrição(ões); cancele-as antes de o remover",
                total
            )))
        }
        Err(e) => Err(e),
    }
}

pub async fn vagas_curso(db_pool: &SqlitePool, id: i64) -> AppResult<VagasCurso> {
    let curso = obter_curso(db_pool, id).await?;
    Ok(VagasCurso {
        curso_id: curso.id,
        vagas_totais: curso.vagas_totais,
        vagas_preenchidas: curso.vagas_preenchidas,
        vagas_disponiveis: curso.vagas_disponiveis(),
    })
}

pub async fn listar_inscricoes_curso(db_pool: &SqlitePool, id: i64) -> AppResult<Vec<Inscricao>> {
    obter_curso(db_pool, id).await?;
    inscricao_repository::listar_por_curso(db_pool, id).await
}

// src/services/aluno_service.rs
use crate::{
    config::PoliticaRemocaoAluno,
    db,
    error::{AppError, AppResult},
    models::{
        aluno::{Aluno, AtualizarAluno, NovoAluno},
        inscricao::Inscricao,
    },
    repository::{self, aluno_repository, curso_repository, inscricao_repository},
};
use sqlx::{SqliteConnection, SqlitePool};

/// Valida os campos obrigatórios e devolve uma cópia sem espaços à volta.
pub fn validar_novo_aluno(novo: &NovoAluno) -> AppResult<NovoAluno> {
    let normalizado = NovoAluno {
        nome: novo.nome.trim().to_string(),
        cpf: novo.cpf.trim().to_string(),
        email: novo.email.trim().to_string(),
        sexo: novo.sexo.trim().to_string(),
        telefone: novo.telefone.trim().to_string(),
        data_nascto: novo.data_nascto,
    };

    let mut em_falta = Vec::new();
    if normalizado.nome.is_empty() {
        em_falta.push("nome");
    }
    if normalizado.cpf.is_empty() {
        em_falta.push("cpf");
    }
    if normalizado.email.is_empty() {
        em_falta.push("email");
    }
    if !em_falta.is_empty() {
        return Err(AppError::Validation(format!(
            "Campos obrigatórios em falta: {}",
            em_falta.join(", ")
        )));
    }
    Ok(normalizado)
}

/// Cria o aluno na conexão dada (pode ser uma transação).
/// `novo` já deve ter passado por `validar_novo_aluno`.
pub(crate) async fn criar_aluno_em(conn: &mut SqliteConnection, novo: &NovoAluno) -> AppResult<Aluno> {
    if aluno_repository::buscar_por_cpf(&mut *conn, &novo.cpf).await?.is_some() {
        return Err(AppError::Conflict(format!("Já existe um aluno com o CPF {}", novo.cpf)));
    }
    if aluno_repository::buscar_por_email(&mut *conn, &novo.email).await?.is_some() {
        return Err(AppError::Conflict(format!("Já existe um aluno com o email {}", novo.email)));
    }

    match aluno_repository::inserir(&mut *conn, novo).await {
        Err(AppError::SqlxError(e)) if repository::eh_violacao_unica(&e) => Err(AppError::Conflict(
            "Já existe um aluno com este CPF ou email".into(),
        )),
        resultado => resultado,
    }
}

pub async fn criar_aluno(db_pool: &SqlitePool, novo: NovoAluno) -> AppResult<Aluno> {
    let novo = validar_novo_aluno(&novo)?;
    tracing::info!("Criando aluno (CPF {})", novo.cpf);

    let mut conn = db_pool.acquire().await?;
    let aluno = criar_aluno_em(&mut conn, &novo).await?;

    tracing::info!("✅ Aluno {} criado com id {}", aluno.nome, aluno.id);
    Ok(aluno)
}

pub async fn listar_alunos(db_pool: &SqlitePool) -> AppResult<Vec<Aluno>> {
    let alunos = aluno_repository::listar(db_pool).await?;
    tracing::debug!("Encontrados {} alunos.", alunos.len());
    Ok(alunos)
}

pub async fn obter_aluno(db_pool: &SqlitePool, id: i64) -> AppResult<Aluno> {
    aluno_repository::buscar_por_id(db_pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Aluno não encontrado com o id {}", id)))
}

// Só substitui quando vem um valor não vazio
fn aplicar(campo: &mut String, novo: Option<String>) {
    if let Some(valor) = novo {
        let valor = valor.trim();
        if !valor.is_empty() {
            *campo = valor.to_string();
        }
    }
}

/// Atualização parcial: campos ausentes ou vazios ficam como estão.
pub async fn atualizar_aluno(db_pool: &SqlitePool, id: i64, dados: AtualizarAluno) -> AppResult<Aluno> {
    let mut aluno = obter_aluno(db_pool, id).await?;
    tracing::info!("Atualizando dados do aluno {}", id);

    aplicar(&mut aluno.nome, dados.nome);
    aplicar(&mut aluno.cpf, dados.cpf);
    aplicar(&mut aluno.email, dados.email);
    aplicar(&mut aluno.sexo, dados.sexo);
    aplicar(&mut aluno.telefone, dados.telefone);
    if dados.data_nascto.is_some() {
        aluno.data_nascto = dados.data_nascto;
    }

    if let Some(outro) = aluno_repository::buscar_por_cpf(db_pool, &aluno.cpf).await? {
        if outro.id != id {
            return Err(AppError::Conflict(format!("Já existe um aluno com o CPF {}", aluno.cpf)));
        }
    }
    if let Some(outro) = aluno_repository::buscar_por_email(db_pool, &aluno.email).await? {
        if outro.id != id {
            return Err(AppError::Conflict(format!("Já existe um aluno com o email {}", aluno.email)));
        }
    }

    let linhas = match aluno_repository::atualizar(db_pool, &aluno).await {
        Err(AppError::SqlxError(e)) if repository::eh_violacao_unica(&e) => {
            return Err(AppError::Conflict("Já existe um aluno com este CPF ou email".into()))
        }
        resultado => resultado?,
    };
    if linhas == 0 {
        // Removido entre a leitura e a escrita
        return Err(AppError::NotFound(format!("Aluno não encontrado com o id {}", id)));
    }

    tracing::info!("✅ Aluno {} atualizado.", id);
    Ok(aluno)
}

pub async fn listar_inscricoes_aluno(db_pool: &SqlitePool, id: i64) -> AppResult<Vec<Inscricao>> {
    obter_aluno(db_pool, id).await?;
    inscricao_repository::listar_por_aluno(db_pool, id).await
}

/// Remove o aluno segundo a política configurada.
pub async fn remover_aluno(
    db_pool: &SqlitePool,
    id: i64,
    politica: PoliticaRemocaoAluno,
    tentativas: u32,
) -> AppResult<()> {
    tracing::info!("Removendo aluno {} (política {:?})", id, politica);
    match politica {
        PoliticaRemocaoAluno::Rejeitar => remover_sem_inscricoes(db_pool, id).await?,
        PoliticaRemocaoAluno::Cascata => {
            db::com_retentativa(tentativas, || remover_em_cascata(db_pool, id)).await?
        }
    }
    tracing::info!("✅ Aluno {} removido.", id);
    Ok(())
}

async fn remover_sem_inscricoes(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    // A FK de inscricoes.aluno_id impede a remoção de quem ainda está inscrito
    match aluno_repository::remover(db_pool, id).await {
        Ok(0) => Err(AppError::NotFound(format!("Aluno não encontrado com o id {}", id))),
        Ok(_) => Ok(()),
        Err(AppError::SqlxError(e)) if repository::eh_violacao_fk(&e) => {
            let ativas = inscricao_repository::contar_por_aluno(db_pool, id).await?;
            Err(AppError::Conflict(format!(
                "O aluno possui {} inscrição(ões) ativa(s); cancele-as antes de o remover",
                ativas
            )))
        }
        Err(e) => Err(e),
    }
}

async fn remover_em_cascata(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    let mut tx = db_pool.begin().await?;

    // Primeira instrução é uma escrita: a transação fica com o lock desde já
    let cursos = inscricao_repository::remover_por_aluno(&mut *tx, id).await?;
    for curso_id in &cursos {
        curso_repository::decrementar_vagas(&mut *tx, *curso_id).await?;
    }

    if aluno_repository::remover(&mut *tx, id).await? == 0 {
        // O drop da transação faz rollback
        return Err(AppError::NotFound(format!("Aluno não encontrado com o id {}", id)));
    }

    tx.commit().await?;
    tracing::debug!("Cascata do aluno {}: {} inscrição(ões) cancelada(s).", id, cursos.len());
    Ok(())
}

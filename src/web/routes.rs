// src/web/routes.rs
use crate::{
    error::AppError,
    state::AppState,
    web::{
        aluno_handlers, auth_handlers, curso_handlers, health_handlers, inscricao_handlers,
        mw_admin, mw_auth,
    },
};
use axum::{
    http::{header, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::{any::Any, time::Duration};
use tower::{Layer, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas Públicas ---
    // Consulta de cursos e vagas, login e a inscrição feita pelo próprio aluno
    let public_routes = Router::new()
        .route("/health", get(health_handlers::handle_health))
        .route("/auth/login", post(auth_handlers::handle_login))
        .route("/curso", get(curso_handlers::handle_listar_cursos))
        .route("/curso/{id}", get(curso_handlers::handle_obter_curso))
        .route("/curso/{id}/vagas", get(curso_handlers::handle_vagas_curso))
        .route("/aluno/inscricao", post(aluno_handlers::handle_cadastrar_e_inscrever));

    // --- Rotas de Admin ---
    // GET /curso/{id} é público; PUT e DELETE no mesmo caminho exigem admin (o merge junta os métodos)
    let admin_routes = Router::new()
        .route("/curso", post(curso_handlers::handle_criar_curso))
        .route(
            "/curso/{id}",
            axum::routing::put(curso_handlers::handle_atualizar_curso)
                .delete(curso_handlers::handle_remover_curso),
        )
        .route("/curso/{id}/inscricoes", get(curso_handlers::handle_inscricoes_curso))
        .route(
            "/aluno",
            get(aluno_handlers::handle_listar_alunos).post(aluno_handlers::handle_criar_aluno),
        )
        .route(
            "/aluno/{id}",
            get(aluno_handlers::handle_obter_aluno)
                .put(aluno_handlers::handle_atualizar_aluno)
                .delete(aluno_handlers::handle_remover_aluno),
        )
        .route("/aluno/{id}/curso/{curso_id}", post(aluno_handlers::handle_inscrever_aluno))
        .route("/aluno/{id}/inscricoes", get(aluno_handlers::handle_inscricoes_aluno))
        .route("/admin/inscricoes", get(inscricao_handlers::handle_listar_inscricoes))
        .route(
            "/admin/inscricoes/{id}",
            get(inscricao_handlers::handle_obter_inscricao)
                .delete(inscricao_handlers::handle_cancelar_inscricao),
        )
        .route("/admin/relatorio", post(inscricao_handlers::handle_gerar_relatorio))
        .route_layer(middleware::from_fn(mw_admin::require_admin));

    // --- Rotas Autenticadas ---
    // Exigem token; as de admin exigem também a role (require_auth corre primeiro)
    let authenticated_routes = Router::new()
        .route("/auth/validate", get(auth_handlers::handle_validate))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    // --- Router Final ---
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .with_state(app_state)
}

// Qualquer origem: o frontend é servido noutro domínio
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
}

// Panics viram 500 com o mesmo corpo `{"error": ..}` dos outros erros
fn resposta_de_panico(erro: Box<dyn Any + Send + 'static>) -> Response {
    let detalhe = erro
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| erro.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "sem detalhe".to_string());
    tracing::error!("💥 Panic ao processar pedido: {}", detalhe);
    AppError::InternalServerError.into_response()
}

// O TimeoutLayer devolve 408 com corpo vazio; os handlers nunca o fazem
async fn resposta_de_timeout(resposta: Response) -> Response {
    if resposta.status() == StatusCode::REQUEST_TIMEOUT
        && !resposta.headers().contains_key(header::CONTENT_TYPE)
    {
        return AppError::Timeout.into_response();
    }
    resposta
}

/// Camadas comuns: trace, panics, timeout e CORS.
/// A conversão do 408 tem de ficar por fora do TimeoutLayer.
fn com_camadas(router: Router, timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(resposta_de_panico))
            .layer(middleware::map_response(resposta_de_timeout))
            .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
            .layer(cors()),
    )
}

/// Router com todas as camadas. `/curso/` e `/curso` são a mesma rota: a
/// normalização tem de envolver o router, senão corre depois do roteamento.
pub fn create_app(app_state: AppState) -> NormalizePath<Router> {
    let timeout = app_state.config.request_timeout;
    let router = com_camadas(create_router(app_state), timeout);
    NormalizePathLayer::trim_trailing_slash().layer(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Config, PoliticaRemocaoAluno},
        db::testes::BaseDeTeste,
        services::auth_service::{testes as auth_testes, ROLE_ADMIN},
    };
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::{sync::Arc, time::Duration};
    use tower::ServiceExt;

    // A base é apagada quando o guard sai de escopo
    async fn estado() -> (BaseDeTeste, AppState) {
        let base = BaseDeTeste::nova().await;
        let config = Config {
            port: 0,
            database_url: String::new(),
            auth: auth_testes::auth_config(),
            tx_tentativas: 3,
            politica_remocao_aluno: PoliticaRemocaoAluno::Rejeitar,
            request_timeout: Duration::from_secs(10),
        };
        let state = AppState {
            db_pool: base.pool.clone(),
            autenticador: Arc::new(auth_testes::autenticador()),
            config: Arc::new(config),
        };
        (base, state)
    }

    fn token_admin(state: &AppState) -> String {
        state.autenticador.emitir_token("admin", ROLE_ADMIN).unwrap().0
    }

    async fn enviar(
        state: &AppState,
        metodo: Method,
        uri: &str,
        token: Option<&str>,
        corpo: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut pedido = Request::builder().method(metodo).uri(uri);
        if let Some(token) = token {
            pedido = pedido.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let pedido = match corpo {
            Some(corpo) => pedido
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(corpo.to_string())),
            None => pedido.body(Body::empty()),
        }
        .unwrap();

        responder(create_app(state.clone()).oneshot(pedido).await.unwrap()).await
    }

    async fn responder(resposta: Response) -> (StatusCode, Value) {
        let status = resposta.status();
        let bytes = to_bytes(resposta.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn curso_json(vagas: i64) -> Value {
        json!({
            "nome": "Informática para Todos",
            "professor": "Paulo",
            "data": "15/04/2025",
            "cargaHoraria": 30,
            "certificado": "Sim",
            "vagasTotais": vagas,
            "vagasPreenchidas": 99
        })
    }

    #[tokio::test]
    async fn health_responde_ok() {
        let (_base, state) = estado().await;
        let (status, corpo) = enviar(&state, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["status"], "ok");
    }

    #[tokio::test]
    async fn rota_de_admin_sem_token_e_401() {
        let (_base, state) = estado().await;
        let (status, corpo) =
            enviar(&state, Method::POST, "/curso", None, Some(curso_json(5))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(corpo["error"].as_str().unwrap().contains("Autorização necessária"));

        let (status, _) = enviar(&state, Method::GET, "/aluno", Some("lixo"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_sem_role_admin_e_403() {
        let (_base, state) = estado().await;
        let (token, _) = state.autenticador.emitir_token("joao", "user").unwrap();

        let (status, _) = enviar(&state, Method::GET, "/admin/inscricoes", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Rotas só autenticadas continuam acessíveis
        let (status, corpo) = enviar(&state, Method::GET, "/auth/validate", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["username"], "joao");
    }

    #[tokio::test]
    async fn login_e_gestao_de_cursos() {
        let (_base, state) = estado().await;
        let (status, corpo) = enviar(
            &state,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "segredo" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = corpo["token"].as_str().unwrap().to_string();

        let (status, _) = enviar(
            &state,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "errada" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, curso) =
            enviar(&state, Method::POST, "/curso", Some(&token), Some(curso_json(5))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(curso["vagasPreenchidas"], 0);
        assert_eq!(curso["data"], "15/04/2025");

        let (status, lista) = enviar(&state, Method::GET, "/curso/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(lista.as_array().unwrap().len(), 1);

        let uri = format!("/curso/{}", curso["id"]);
        let (status, atualizado) =
            enviar(&state, Method::PUT, &uri, Some(&token), Some(json!({ "professor": "Rita" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(atualizado["professor"], "Rita");
        assert_eq!(atualizado["nome"], "Informática para Todos");

        let (status, _) = enviar(&state, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, corpo) = enviar(&state, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(corpo["error"].is_string());
    }

    #[tokio::test]
    async fn id_invalido_e_400() {
        let (_base, state) = estado().await;
        let (status, corpo) = enviar(&state, Method::GET, "/curso/abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(corpo["error"].is_string());
    }

    #[tokio::test]
    async fn inscricao_publica_e_inscricao_pelo_admin() {
        let (_base, state) = estado().await;
        let token = token_admin(&state);
        let (_, curso) = enviar(&state, Method::POST, "/curso", Some(&token), Some(curso_json(2))).await;
        let curso_id = curso["id"].as_i64().unwrap();

        let pedido = json!({
            "aluno": {
                "nome": "Lucas Pereira",
                "cpf": "123.456.789-00",
                "email": "lucas@exemplo.com",
                "sexo": "M",
                "dataNascto": "02/09/1999"
            },
            "cursoId": curso_id,
            "inscricao": { "bairro": "Centro", "autorizaWhatsApp": true }
        });
        let (status, corpo) =
            enviar(&state, Method::POST, "/aluno/inscricao", None, Some(pedido.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(corpo["aluno"]["dataNascto"], "02/09/1999");
        assert_eq!(corpo["inscricao"]["autorizaWhatsApp"], true);

        let (status, _) = enviar(&state, Method::POST, "/aluno/inscricao", None, Some(pedido)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Aluno criado pelo admin, inscrito sem corpo
        let (status, aluno) = enviar(
            &state,
            Method::POST,
            "/aluno",
            Some(&token),
            Some(json!({ "nome": "Bia", "cpf": "999", "email": "bia@exemplo.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/aluno/{}/curso/{}", aluno["id"], curso_id);
        let (status, _) = enviar(&state, Method::POST, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, vagas) =
            enviar(&state, Method::GET, &format!("/curso/{curso_id}/vagas"), None, None).await;
        assert_eq!(vagas["vagasPreenchidas"], 2);
        assert_eq!(vagas["vagasDisponiveis"], 0);

        let (status, _) = enviar(&state, Method::POST, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, lista) =
            enviar(&state, Method::GET, "/admin/inscricoes", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(lista.as_array().unwrap().len(), 2);
        assert_eq!(lista[0]["aluno"]["nome"], "Lucas Pereira");
    }

    #[tokio::test]
    async fn relatorio() {
        let (_base, state) = estado().await;
        let token = token_admin(&state);

        let (status, corpo) = enviar(
            &state,
            Method::POST,
            "/admin/relatorio",
            Some(&token),
            Some(json!([{ "ehPCD": "sim" }, { "ehPCD": "não", "ehCuidador": "S" }])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["resumo"]["totalRegistros"], 2);
        assert_eq!(corpo["resumo"]["comPCD"], 1);
        assert_eq!(corpo["resumo"]["cuidadores"], 1);

        let (status, _) =
            enviar(&state, Method::POST, "/admin/relatorio", Some(&token), Some(json!([]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pedido_lento_e_408_com_corpo_json() {
        let router = Router::new().route(
            "/lento",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "tarde demais"
            }),
        );
        let app = com_camadas(router, Duration::from_millis(20));
        let pedido = Request::builder().uri("/lento").body(Body::empty()).unwrap();

        let (status, corpo) = responder(app.oneshot(pedido).await.unwrap()).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(corpo["error"], "Tempo limite do pedido excedido");
    }

    #[tokio::test]
    async fn panic_no_handler_e_500_com_corpo_json() {
        async fn rebenta() -> &'static str {
            panic!("estado impossível")
        }
        let app = com_camadas(Router::new().route("/rebenta", get(rebenta)), Duration::from_secs(5));
        let pedido = Request::builder().uri("/rebenta").body(Body::empty()).unwrap();

        let (status, corpo) = responder(app.oneshot(pedido).await.unwrap()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(corpo["error"], "Ocorreu um erro inesperado.");
    }

    #[tokio::test]
    async fn pedido_rapido_nao_e_afetado_pelo_timeout() {
        let (_base, state) = estado().await;
        let (status, corpo) = enviar(&state, Method::GET, "/curso", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(corpo.is_array());
    }
}

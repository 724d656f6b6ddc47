//src/main.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
mod store;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // O painel roda em outra porta; o CORS precisa liberar credenciais.
    let cors_origin =
        std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".into());
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .expect("CORS_ORIGIN inválido"),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout));

    // Tudo abaixo exige Bearer token válido.
    let protected_routes = Router::new()
        .route("/auth/verify", get(handlers::auth::verify))
        .route(
            "/instances",
            get(handlers::instancias::listar).post(handlers::instancias::adicionar),
        )
        .route(
            "/instances/{id}",
            put(handlers::instancias::atualizar).delete(handlers::instancias::remover),
        )
        .route("/generate-code", post(handlers::conexao::gerar_codigo))
        .route(
            "/check-connection",
            post(handlers::conexao::verificar_conexao),
        )
        .route(
            "/templates",
            get(handlers::templates::listar).post(handlers::templates::criar),
        )
        .route(
            "/templates/{id}",
            put(handlers::templates::atualizar).delete(handlers::templates::remover),
        )
        .route(
            "/campanhas",
            get(handlers::campanhas::listar).post(handlers::campanhas::criar),
        )
        .route("/campanhas/{id}", delete(handlers::campanhas::remover))
        .route("/mensagens/stats", get(handlers::mensagens::estatisticas))
        .route("/mensagens/history", get(handlers::mensagens::historico))
        .route("/mensagens/record", post(handlers::mensagens::registrar))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route(
            "/api/check-status",
            get(|| async { Json(json!({ "status": "ok" })) }),
        )
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .layer(cors)
        .with_state(app_state);

    // Inicia o servidor
    let porta = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{porta}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}

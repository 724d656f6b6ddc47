// src/handlers/mensagens.rs
//
// O caderno de envios: o painel registra cada disparo aqui e depois
// consome os agregados e o histórico recente.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoricoQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarMensagemPayload {
    pub instancia_id: String,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

// GET /api/mensagens/stats
#[utoipa::path(
    get,
    path = "/api/mensagens/stats",
    tag = "Mensagens",
    responses((status = 200, description = "Estatísticas agregadas de envio")),
    security(("api_jwt" = []))
)]
pub async fn estatisticas(State(app_state): State<AppState>) -> impl IntoResponse {
    let dados = app_state.mensagens.estatisticas().await;
    Json(json!({ "success": true, "data": dados }))
}

// GET /api/mensagens/history?limit=
#[utoipa::path(
    get,
    path = "/api/mensagens/history",
    tag = "Mensagens",
    params(HistoricoQuery),
    responses((status = 200, description = "Histórico recente, do mais novo para o mais velho")),
    security(("api_jwt" = []))
)]
pub async fn historico(
    State(app_state): State<AppState>,
    Query(query): Query<HistoricoQuery>,
) -> impl IntoResponse {
    let limite = query.limit.unwrap_or(50);
    let registros = app_state.mensagens.historico(limite).await;
    Json(json!({ "success": true, "data": registros }))
}

// POST /api/mensagens/record
#[utoipa::path(
    post,
    path = "/api/mensagens/record",
    tag = "Mensagens",
    request_body = RegistrarMensagemPayload,
    responses(
        (status = 200, description = "Envio registrado"),
        (status = 400, description = "ID da instância ausente")
    ),
    security(("api_jwt" = []))
)]
pub async fn registrar(
    State(app_state): State<AppState>,
    Json(payload): Json<RegistrarMensagemPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.instancia_id.trim().is_empty() {
        return Err(AppError::validation("ID da instância é obrigatório"));
    }

    app_state
        .mensagens
        .registrar(
            &payload.instancia_id,
            payload.template_id.as_deref(),
            payload.template_name.as_deref(),
            payload.success,
            payload.error.as_deref(),
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Mensagem registrada com sucesso",
    })))
}

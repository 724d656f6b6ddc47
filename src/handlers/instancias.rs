// src/handlers/instancias.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::status::PainelInstancias,
};

// GET /api/instances
//
// A rota mais cara do painel: dispara status + statistics na Z-API para
// cada instância cadastrada e devolve a frota agregada.
#[utoipa::path(
    get,
    path = "/api/instances",
    tag = "Instâncias",
    responses(
        (status = 200, description = "Frota com status agregado", body = PainelInstancias)
    ),
    security(("api_jwt" = []))
)]
pub async fn listar(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let painel = app_state.status_service.agregar().await;
    Ok(Json(painel))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriarInstanciaPayload {
    #[validate(length(min = 10, message = "ID e Token devem ter pelo menos 10 caracteres"))]
    #[schema(example = "3E69982096F4505C5A2D02BF121A361F")]
    pub instance_id: String,

    #[validate(length(min = 10, message = "ID e Token devem ter pelo menos 10 caracteres"))]
    pub instance_token: String,

    pub instance_name: Option<String>,
}

// POST /api/instances
#[utoipa::path(
    post,
    path = "/api/instances",
    tag = "Instâncias",
    request_body = CriarInstanciaPayload,
    responses(
        (status = 200, description = "Instância adicionada"),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Instância já configurada")
    ),
    security(("api_jwt" = []))
)]
pub async fn adicionar(
    State(app_state): State<AppState>,
    Json(payload): Json<CriarInstanciaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let instancia = app_state
        .instancias
        .adicionar(
            &payload.instance_id,
            &payload.instance_token,
            payload.instance_name,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Instância adicionada com sucesso",
        "instance": instancia,
    })))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarInstanciaPayload {
    // Um novo id é opcional; o token é obrigatório na troca, como no painel.
    #[validate(length(min = 10, message = "ID deve ter pelo menos 10 caracteres"))]
    pub instance_id: Option<String>,

    #[validate(length(min = 10, message = "Token deve ter pelo menos 10 caracteres"))]
    pub instance_token: String,

    pub instance_name: Option<String>,
}

// PUT /api/instances/{id}
#[utoipa::path(
    put,
    path = "/api/instances/{id}",
    tag = "Instâncias",
    request_body = AtualizarInstanciaPayload,
    params(("id" = String, Path, description = "ID atual da instância")),
    responses(
        (status = 200, description = "Instância modificada"),
        (status = 404, description = "Instância não encontrada"),
        (status = 409, description = "Novo ID já configurado")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AtualizarInstanciaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let instancia = app_state
        .instancias
        .atualizar(
            &id,
            payload.instance_id,
            Some(payload.instance_token),
            payload.instance_name,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Instância modificada com sucesso",
        "instance": instancia,
    })))
}

// DELETE /api/instances/{id}
#[utoipa::path(
    delete,
    path = "/api/instances/{id}",
    tag = "Instâncias",
    params(("id" = String, Path, description = "ID da instância")),
    responses(
        (status = 200, description = "Instância excluída"),
        (status = 404, description = "Instância não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn remover(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.instancias.remover(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Instância excluída com sucesso",
        "instanceId": id,
    })))
}

// src/handlers/conexao.rs
//
// Pareamento por código: o fluxo alternativo ao QR code. O serviço varre
// as instâncias e usa a primeira desconectada que topar gerar o código.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct GerarCodigoPayload {
    #[schema(example = "+55 11 91234-5678")]
    pub phone: String,
}

// POST /api/generate-code
#[utoipa::path(
    post,
    path = "/api/generate-code",
    tag = "Conexão",
    request_body = GerarCodigoPayload,
    responses(
        (status = 200, description = "Código gerado"),
        (status = 400, description = "Número de telefone inválido"),
        (status = 503, description = "Nenhuma instância disponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn gerar_codigo(
    State(app_state): State<AppState>,
    Json(payload): Json<GerarCodigoPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.phone.trim().is_empty() {
        return Err(AppError::validation(
            "Número de telefone inválido ou não fornecido",
        ));
    }

    // Só os dígitos interessam para a Z-API.
    let telefone: String = payload.phone.chars().filter(char::is_ascii_digit).collect();
    if telefone.len() < 10 {
        return Err(AppError::validation("Número de telefone inválido"));
    }

    let (codigo, instancia_id) = app_state.status_service.gerar_codigo(&telefone).await?;

    Ok(Json(json!({
        "code": codigo,
        "instance_id": instancia_id,
    })))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerificarConexaoPayload {
    pub instance_id: String,
}

// POST /api/check-connection
#[utoipa::path(
    post,
    path = "/api/check-connection",
    tag = "Conexão",
    request_body = VerificarConexaoPayload,
    responses(
        (status = 200, description = "Status de conexão da instância"),
        (status = 404, description = "Instância não encontrada"),
        (status = 503, description = "Erro ao consultar a Z-API")
    ),
    security(("api_jwt" = []))
)]
pub async fn verificar_conexao(
    State(app_state): State<AppState>,
    Json(payload): Json<VerificarConexaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.instance_id.trim().is_empty() {
        return Err(AppError::validation(
            "ID da instância inválido ou não fornecido",
        ));
    }

    let conectada = app_state
        .status_service
        .verificar_conexao(&payload.instance_id)
        .await?;

    Ok(Json(json!({
        "connected": conectada,
        "instance_id": payload.instance_id,
    })))
}

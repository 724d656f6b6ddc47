// src/handlers/campanhas.rs
//
// Listas de números para disparo. O painel manda os números já separados
// ou o texto colado cru; os dois caminhos passam pela mesma extração.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriarCampanhaPayload {
    pub name: String,
    // Uma linha por número quando vem como lista.
    #[serde(default)]
    pub phone_numbers: Option<Vec<String>>,
    #[serde(default)]
    pub raw_text: Option<String>,
}

// GET /api/campanhas
#[utoipa::path(
    get,
    path = "/api/campanhas",
    tag = "Campanhas",
    responses((status = 200, description = "Lista de campanhas")),
    security(("api_jwt" = []))
)]
pub async fn listar(State(app_state): State<AppState>) -> impl IntoResponse {
    // O painel consome o array puro, sem envelope.
    Json(app_state.campanhas.listar().await)
}

// POST /api/campanhas
#[utoipa::path(
    post,
    path = "/api/campanhas",
    tag = "Campanhas",
    request_body = CriarCampanhaPayload,
    responses(
        (status = 200, description = "Campanha criada"),
        (status = 400, description = "Nome ausente ou nenhum número válido"),
        (status = 409, description = "Nome já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar(
    State(app_state): State<AppState>,
    Json(payload): Json<CriarCampanhaPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Nome da campanha é obrigatório"));
    }

    let texto_bruto = match (&payload.phone_numbers, &payload.raw_text) {
        (Some(numeros), _) if !numeros.is_empty() => numeros.join("\n"),
        (_, Some(texto)) => texto.clone(),
        _ => String::new(),
    };

    let campanha = app_state.campanhas.criar(&payload.name, &texto_bruto).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Campanha criada com sucesso!",
        "campanha": campanha,
    })))
}

// DELETE /api/campanhas/{id}
#[utoipa::path(
    delete,
    path = "/api/campanhas/{id}",
    tag = "Campanhas",
    params(("id" = String, Path, description = "ID da campanha")),
    responses(
        (status = 200, description = "Campanha excluída"),
        (status = 404, description = "Campanha não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn remover(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.campanhas.remover(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Campanha excluída com sucesso!",
        "deletedId": id,
    })))
}

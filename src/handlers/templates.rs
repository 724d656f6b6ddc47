// src/handlers/templates.rs
//
// CRUD dos templates. O payload aceita os dois formatos do painel no
// mesmo endpoint: template de mensagem (name/message) e template de
// imagem (nome/url). A mídia chega já resolvida pela camada de upload.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    models::template::{Midia, Perfil},
    store::template_store::{ArquivoEnviado, AtualizacaoTemplate, EntradaMidia, NovoTemplate},
};

// Descritor do arquivo que a camada de upload gravou em uploads/.
// Serialize também: os payloads com `#[serde(default)]` precisam renderizar
// os valores padrão no schema da documentação.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResolvido {
    pub url: String,
    pub original_name: String,
    pub size: u64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CriarTemplatePayload {
    // Formato de mensagem.
    pub name: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub footer: Option<String>,
    pub buttons: Option<Vec<Value>>,
    pub profile_name: Option<String>,
    pub profile_photo: Option<String>,
    pub profile_bio: Option<String>,

    // Formato de imagem.
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub url: Option<String>,

    // Mídia anexa (no máximo uma das três fontes).
    pub media_type: Option<String>,
    pub media_url: Option<String>,
    pub existing_media: Option<Midia>,
    pub uploaded_file: Option<UploadResolvido>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AtualizarTemplatePayload {
    pub name: String,
    pub title: String,
    pub message: String,
    pub footer: String,
    pub buttons: Option<Vec<Value>>,
    pub profile_name: Option<String>,
    pub profile_photo: Option<String>,
    pub profile_bio: Option<String>,

    pub media_type: Option<String>,
    pub media_url: Option<String>,
    pub existing_media: Option<Midia>,
    pub uploaded_file: Option<UploadResolvido>,
}

fn montar_midia(
    tipo: Option<String>,
    upload: Option<UploadResolvido>,
    url: Option<String>,
    existente: Option<Midia>,
) -> EntradaMidia {
    EntradaMidia {
        tipo,
        upload: upload.map(|u| ArquivoEnviado {
            url: u.url,
            nome_original: u.original_name,
            tamanho_bytes: u.size,
        }),
        url,
        existente,
    }
}

fn montar_perfil(name: Option<String>, photo: Option<String>, bio: Option<String>) -> Perfil {
    Perfil {
        name: name.unwrap_or_default(),
        photo: photo.unwrap_or_default(),
        bio: bio.unwrap_or_default(),
    }
}

// GET /api/templates
#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Templates",
    responses((status = 200, description = "Lista de templates")),
    security(("api_jwt" = []))
)]
pub async fn listar(State(app_state): State<AppState>) -> impl IntoResponse {
    let templates = app_state.templates.listar().await;
    Json(json!({ "templates": templates }))
}

// POST /api/templates
#[utoipa::path(
    post,
    path = "/api/templates",
    tag = "Templates",
    request_body = CriarTemplatePayload,
    responses(
        (status = 200, description = "Template criado"),
        (status = 400, description = "Campos obrigatórios ausentes"),
        (status = 409, description = "Nome já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar(
    State(app_state): State<AppState>,
    Json(payload): Json<CriarTemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let novo = NovoTemplate {
        nome: payload.nome,
        descricao: payload.descricao,
        url: payload.url,
        name: payload.name,
        title: payload.title,
        message: payload.message,
        footer: payload.footer,
        buttons: payload.buttons.unwrap_or_default(),
        profile: montar_perfil(
            payload.profile_name,
            payload.profile_photo,
            payload.profile_bio,
        ),
        midia: montar_midia(
            payload.media_type,
            payload.uploaded_file,
            payload.media_url,
            payload.existing_media,
        ),
    };

    let criado = app_state.templates.criar(novo).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Template criado com sucesso!",
        "template": criado,
    })))
}

// PUT /api/templates/{id}
#[utoipa::path(
    put,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "ID do template")),
    request_body = AtualizarTemplatePayload,
    responses(
        (status = 200, description = "Template atualizado"),
        (status = 400, description = "Template não é de mensagem"),
        (status = 404, description = "Template não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AtualizarTemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let dados = AtualizacaoTemplate {
        name: payload.name,
        title: payload.title,
        message: payload.message,
        footer: payload.footer,
        buttons: payload.buttons.unwrap_or_default(),
        profile: montar_perfil(
            payload.profile_name,
            payload.profile_photo,
            payload.profile_bio,
        ),
        midia: montar_midia(
            payload.media_type,
            payload.uploaded_file,
            payload.media_url,
            payload.existing_media,
        ),
    };

    let atualizado = app_state.templates.atualizar(&id, dados).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Template atualizado com sucesso",
        "template": atualizado,
    })))
}

// DELETE /api/templates/{id}
#[utoipa::path(
    delete,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "ID do template")),
    responses(
        (status = 200, description = "Template excluído"),
        (status = 404, description = "Template não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn remover(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let removido = app_state.templates.remover(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Template excluído com sucesso!",
        "deletedId": removido,
    })))
}

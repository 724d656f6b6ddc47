// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, middleware::auth::UsuarioAutenticado,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Usuário e senha são obrigatórios"))]
    #[schema(example = "admin")]
    pub username: String,

    #[validate(length(min = 1, message = "Usuário e senha são obrigatórios"))]
    pub password: String,
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login realizado com sucesso"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (token, usuario) = app_state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Login realizado com sucesso",
        "token": token,
        "user": usuario,
    })))
}

// GET /api/auth/verify
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token válido"),
        (status = 401, description = "Token inválido ou expirado")
    ),
    security(("api_jwt" = []))
)]
pub async fn verify(
    UsuarioAutenticado(usuario): UsuarioAutenticado,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(json!({
        "success": true,
        "user": usuario,
    })))
}

// POST /api/auth/logout
//
// O token vive no cliente; o logout aqui é só a confirmação.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logout realizado com sucesso"))
)]
pub async fn logout() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Logout realizado com sucesso",
    }))
}

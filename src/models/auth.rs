// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// As claims do nosso JWT. `exp` em segundos desde a época, como o
// jsonwebtoken espera.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub login_time: String,
    pub exp: i64,
}

// Representação do usuário logado que circula nos extensions da requisição.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Usuario {
    pub username: String,
    pub role: String,
}

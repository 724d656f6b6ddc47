// src/services/auth.rs

use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    common::error::AppError,
    models::auth::{Claims, Usuario},
};

const VALIDADE_TOKEN_HORAS: i64 = 24;

// Autenticação mínima do painel: um único usuário admin, com o hash da
// senha vindo da configuração, e um JWT HS256 de 24h. Não há cadastro nem
// troca de senha — quem cuida disso é o operador, via variável de ambiente.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    admin_username: String,
    admin_password_hash: String,
}

impl AuthService {
    pub fn new(jwt_secret: String, admin_username: String, admin_password_hash: String) -> Self {
        Self {
            jwt_secret,
            admin_username,
            admin_password_hash,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(String, Usuario), AppError> {
        if username != self.admin_username {
            return Err(AppError::InvalidCredentials);
        }

        // bcrypt é pesado de propósito; roda fora do executor async.
        let senha = password.to_owned();
        let hash = self.admin_password_hash.clone();
        let senha_confere = tokio::task::spawn_blocking(move || verify(&senha, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação: {e}"))?
            .map_err(|e| anyhow::anyhow!("Erro de Bcrypt: {e}"))?;

        if !senha_confere {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.emitir_token(username)?;
        let usuario = Usuario {
            username: username.to_string(),
            role: "admin".to_string(),
        };

        tracing::info!(usuario = username, "Login realizado");
        Ok((token, usuario))
    }

    fn emitir_token(&self, username: &str) -> Result<String, AppError> {
        let agora = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            role: "admin".to_string(),
            login_time: agora.to_rfc3339(),
            exp: (agora + Duration::hours(VALIDADE_TOKEN_HORAS)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Erro de JWT: {e}")))
    }

    pub fn validar_token(&self, token: &str) -> Result<Usuario, AppError> {
        let dados = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(Usuario {
            username: dados.claims.sub,
            role: dados.claims.role,
        })
    }
}

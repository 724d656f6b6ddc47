// src/config.rs

use std::{env, path::PathBuf};

use crate::{
    common::json_store::JsonStore,
    services::{AuthService, StatusService, ZapiClient},
    store::{CampaignStore, InstanceStore, MessageLedger, TemplateStore},
};

// Hash bcrypt da senha padrão "admin123". Em produção o operador define
// ADMIN_PASSWORD_HASH no ambiente.
const HASH_ADMIN_PADRAO: &str = "$2b$10$PyBz/zvgs3PWhgkgWGZ0auyal4VF0OaoWJC0yRD0qMrvIjDg.0pOC";

// O estado compartilhado que será acessível em toda a aplicação.
#[derive(Clone)]
pub struct AppState {
    pub instancias: InstanceStore,
    pub templates: TemplateStore,
    pub campanhas: CampaignStore,
    pub mensagens: MessageLedger,
    pub status_service: StatusService,
    pub auth_service: AuthService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let pasta_dados = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".into()));
        let pasta_uploads = PathBuf::from(env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".into()));

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "dashboard-whatsapp-secret-key-2024".into());
        let admin_username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
        let admin_password_hash =
            env::var("ADMIN_PASSWORD_HASH").unwrap_or_else(|_| HASH_ADMIN_PADRAO.into());

        // Token da conta usado como fallback quando o instances.json ainda
        // não tem um TOKEN_CONTA.
        let token_conta_padrao = env::var("ZAPI_TOKEN_CONTA").unwrap_or_default();
        let zapi_base_url =
            env::var("ZAPI_BASE_URL").unwrap_or_else(|_| "https://api.z-api.io".into());

        // --- Monta o gráfico de dependências ---
        let instancias = InstanceStore::new(
            JsonStore::new(pasta_dados.join("instances.json")),
            token_conta_padrao,
        );
        let templates = TemplateStore::new(
            JsonStore::new(pasta_dados.join("templates.json")),
            pasta_uploads,
        );
        let campanhas = CampaignStore::new(JsonStore::new(pasta_dados.join("campanhas.json")));
        let mensagens = MessageLedger::new(JsonStore::new(pasta_dados.join("mensagens.json")));

        let zapi = ZapiClient::com_base_url(zapi_base_url);
        let status_service = StatusService::new(zapi, instancias.clone());
        let auth_service = AuthService::new(jwt_secret, admin_username, admin_password_hash);

        tracing::info!("✅ Lojas de dados inicializadas em {}", pasta_dados.display());

        Ok(Self {
            instancias,
            templates,
            campanhas,
            mensagens,
            status_service,
            auth_service,
        })
    }
}

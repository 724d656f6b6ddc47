// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::verify,
        handlers::auth::logout,

        // --- Instâncias ---
        handlers::instancias::listar,
        handlers::instancias::adicionar,
        handlers::instancias::atualizar,
        handlers::instancias::remover,

        // --- Conexão ---
        handlers::conexao::gerar_codigo,
        handlers::conexao::verificar_conexao,

        // --- Templates ---
        handlers::templates::listar,
        handlers::templates::criar,
        handlers::templates::atualizar,
        handlers::templates::remover,

        // --- Campanhas ---
        handlers::campanhas::listar,
        handlers::campanhas::criar,
        handlers::campanhas::remover,

        // --- Mensagens ---
        handlers::mensagens::estatisticas,
        handlers::mensagens::historico,
        handlers::mensagens::registrar,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Usuario,
            handlers::auth::LoginPayload,

            // --- Instâncias ---
            models::instancia::Instancia,
            models::status::InstanciaStatus,
            models::status::EstatisticasFrota,
            models::status::PainelInstancias,
            handlers::instancias::CriarInstanciaPayload,
            handlers::instancias::AtualizarInstanciaPayload,

            // --- Conexão ---
            handlers::conexao::GerarCodigoPayload,
            handlers::conexao::VerificarConexaoPayload,

            // --- Templates ---
            models::template::Template,
            models::template::TemplateMensagem,
            models::template::TemplateImagem,
            models::template::Midia,
            models::template::Perfil,
            handlers::templates::CriarTemplatePayload,
            handlers::templates::AtualizarTemplatePayload,
            handlers::templates::UploadResolvido,

            // --- Campanhas ---
            models::campanha::Campanha,
            handlers::campanhas::CriarCampanhaPayload,

            // --- Mensagens ---
            models::mensagens::RegistroMensagem,
            models::mensagens::EstatisticasMensagens,
            handlers::mensagens::RegistrarMensagemPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação do painel"),
        (name = "Instâncias", description = "Registro e status da frota Z-API"),
        (name = "Conexão", description = "Pareamento por código e verificação de conexão"),
        (name = "Templates", description = "Modelos de mensagem e de imagem"),
        (name = "Campanhas", description = "Listas de números para disparo"),
        (name = "Mensagens", description = "Registro e estatísticas de envios")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

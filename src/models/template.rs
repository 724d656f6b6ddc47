// src/models/template.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- MÍDIA ---

// Metadados da mídia anexada a um template de mensagem. O arquivo em si é
// resolvido pela camada de upload; aqui só guardamos o descritor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Midia {
    #[serde(rename = "type")]
    pub tipo: Option<String>,
    pub url: Option<String>,
    pub filename: Option<String>,
    // Tamanho legível ("2.4 MB") ou "URL Externa" para links.
    pub size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Perfil {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub bio: String,
}

// --- O TEMPLATE EM SI ---

// Duas variantes que só compartilham `id` e `createdAt`. No disco não existe
// campo discriminador: um template de mensagem tem (name, message) e um de
// imagem tem (nome, url). O `untagged` reproduz exatamente essa distinção
// na leitura, e os construtores `novo` garantem que nunca criamos um
// registro que não caia limpo em uma das variantes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Template {
    Mensagem(TemplateMensagem),
    Imagem(TemplateImagem),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMensagem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub footer: String,
    #[serde(default)]
    pub media: Midia,
    // O formato dos botões é livre (o painel monta), guardamos como veio.
    #[serde(default)]
    pub buttons: Vec<Value>,
    #[serde(default)]
    pub profile: Perfil,
    // Registro editado na mão pode vir sem timestamps; entra com "agora"
    // em vez de ser descartado.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateImagem {
    pub id: String,
    pub nome: String,
    #[serde(default)]
    pub descricao: String,
    pub url: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl TemplateMensagem {
    pub fn novo(
        name: &str,
        title: &str,
        message: &str,
        footer: &str,
        media: Midia,
        buttons: Vec<Value>,
        profile: Perfil,
    ) -> Result<Self, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Nome do template é obrigatório"));
        }
        if message.trim().is_empty() {
            return Err(AppError::validation("Mensagem do template é obrigatória"));
        }

        let agora = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            title: title.trim().to_string(),
            message: message.trim().to_string(),
            footer: footer.trim().to_string(),
            media,
            buttons,
            profile,
            created_at: agora,
            updated_at: agora,
        })
    }
}

impl TemplateImagem {
    pub fn novo(nome: &str, descricao: &str, url: &str) -> Result<Self, AppError> {
        if nome.trim().is_empty() {
            return Err(AppError::validation("Nome do template é obrigatório"));
        }
        if url.trim().is_empty() {
            return Err(AppError::validation("URL da imagem inválida"));
        }
        if !url_http_valida(url) {
            return Err(AppError::validation("Formato de URL inválido"));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            nome: nome.trim().to_string(),
            descricao: descricao.trim().to_string(),
            url: url.trim().to_string(),
            created_at: Utc::now(),
        })
    }
}

impl Template {
    pub fn id(&self) -> &str {
        match self {
            Template::Mensagem(t) => &t.id,
            Template::Imagem(t) => &t.id,
        }
    }

    // A chave única de cada variante: `name` para mensagem, `nome` para imagem.
    pub fn chave(&self) -> &str {
        match self {
            Template::Mensagem(t) => &t.name,
            Template::Imagem(t) => &t.nome,
        }
    }

    // Predicado de sanidade aplicado na leitura do arquivo. Registro que não
    // satisfaz o conjunto obrigatório de exatamente uma variante é lixo e
    // deve ser descartado, nunca devolvido ao painel.
    pub fn valido(&self) -> bool {
        match self {
            Template::Mensagem(t) => {
                !t.id.trim().is_empty()
                    && !t.name.trim().is_empty()
                    && !t.message.trim().is_empty()
            }
            Template::Imagem(t) => {
                !t.id.trim().is_empty()
                    && !t.nome.trim().is_empty()
                    && url_http_valida(&t.url)
            }
        }
    }
}

pub fn url_http_valida(url: &str) -> bool {
    let resto = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(resto, Some(r) if !r.is_empty())
}

// O formato do templates.json no disco. Os itens ficam como `Value` cru para
// uma entrada corrompida não derrubar o parse do arquivo inteiro — a loja
// filtra entrada por entrada.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArquivoTemplates {
    #[serde(default)]
    pub templates: Vec<Value>,
}

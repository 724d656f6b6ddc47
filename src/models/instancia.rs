// src/models/instancia.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Uma instância é um par de credenciais (id + token) amarrado a uma conexão
// na Z-API. O `name` é só um rótulo de exibição, opcional.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Instancia {
    pub id: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// O formato do instances.json no disco. Os nomes em CAIXA ALTA vêm do
// painel original e são mantidos para o arquivo continuar compatível
// (o operador edita esse arquivo na mão).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArquivoConfig {
    #[serde(rename = "TOKEN_CONTA", default)]
    pub token_conta: String,

    #[serde(rename = "INSTANCIAS", default)]
    pub instancias: Vec<Instancia>,
}

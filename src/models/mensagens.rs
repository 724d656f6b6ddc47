// src/models/mensagens.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Um envio registrado no histórico (sucesso ou falha).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistroMensagem {
    pub timestamp: DateTime<Utc>,
    pub instancia_id: String,
    pub template_id: Option<String>,
    pub template_name: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContadorEnvios {
    pub enviadas: u64,
    pub sucesso: u64,
    pub erro: u64,
}

impl ContadorEnvios {
    pub fn registrar(&mut self, sucesso: bool) {
        self.enviadas += 1;
        if sucesso {
            self.sucesso += 1;
        } else {
            self.erro += 1;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContadorTemplate {
    // Nome do template na época do primeiro envio.
    pub nome: Option<String>,
    pub enviadas: u64,
    pub sucesso: u64,
    pub erro: u64,
}

impl ContadorTemplate {
    pub fn registrar(&mut self, sucesso: bool) {
        self.enviadas += 1;
        if sucesso {
            self.sucesso += 1;
        } else {
            self.erro += 1;
        }
    }
}

// Os acumulados que o dashboard exibe: totais, por instância, por template
// e por dia ("YYYY-MM-DD"). BTreeMap para o JSON sair em ordem estável.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstatisticasMensagens {
    pub total_enviadas: u64,
    pub total_sucesso: u64,
    pub total_erro: u64,
    pub ultima_atualizacao: Option<DateTime<Utc>>,
    #[serde(default)]
    pub por_instancia: BTreeMap<String, ContadorEnvios>,
    #[serde(default)]
    pub por_template: BTreeMap<String, ContadorTemplate>,
    #[serde(default)]
    pub por_dia: BTreeMap<String, ContadorEnvios>,
}

// O formato do mensagens.json no disco.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArquivoMensagens {
    #[serde(default)]
    pub estatisticas: EstatisticasMensagens,
    #[serde(default)]
    pub historico: Vec<RegistroMensagem>,
}

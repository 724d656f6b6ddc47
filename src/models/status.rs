// src/models/status.rs

use serde::Serialize;
use utoipa::ToSchema;

// Uma linha do painel: a instância com o estado que conseguimos apurar
// na Z-API. Os fallbacks ("N/A", contadores zerados) são os mesmos que o
// painel exibe quando a instância está com problema.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstanciaStatus {
    pub id: String,
    pub token: String,
    pub name: String,
    pub phone_number: String,
    pub connected: bool,
    pub messages: i64,
    pub contacts: i64,
    pub qr_code: Option<String>,
    pub last_activity: String,
    pub battery_level: Option<i64>,
    pub error: Option<String>,
}

// Resumo da frota inteira, recalculado a cada pedido de agregação.
// Invariante: active + inactive == total (instância com erro conta como
// inativa).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstatisticasFrota {
    pub total_instances: usize,
    pub active_instances: usize,
    pub inactive_instances: usize,
    pub error_instances: usize,
    pub total_messages: i64,
    pub total_contacts: i64,
    pub qr_instances: usize,
    // active/total em %, uma casa decimal. 0 quando não há instâncias.
    pub active_percentage: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PainelInstancias {
    pub instances: Vec<InstanciaStatus>,
    pub account_token: String,
    pub statistics: EstatisticasFrota,
}

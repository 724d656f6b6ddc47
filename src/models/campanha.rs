// src/models/campanha.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Uma campanha é um nome + a lista de números extraída do arquivo que o
// usuário subiu. `totalNumbers` é derivado e precisa bater com o tamanho
// da lista (a loja recalcula na leitura caso o arquivo tenha sido editado
// na mão).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Campanha {
    pub id: String,
    pub name: String,
    // Só dígitos, 8 a 15 por número, sem repetidos.
    pub phone_numbers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub total_numbers: usize,
}

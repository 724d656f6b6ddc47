// src/store/campaign_store.rs
//
// Campanhas de disparo: um nome + a lista de números extraída do texto que
// o usuário colou/subiu (um número por linha). O campanhas.json é um array
// puro, mantido compatível com o painel original.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::{error::AppError, json_store::JsonStore},
    models::campanha::Campanha,
};

// Extrai os números de telefone de um texto cru, linha a linha:
// tira aspas e espaços, joga fora tudo que não é dígito e só aceita o que
// sobrar com 8 a 15 dígitos. Repetidos caem, mantendo a primeira ocorrência.
// Rodar duas vezes sobre o mesmo texto dá sempre o mesmo resultado.
pub fn extrair_numeros(texto: &str) -> Vec<String> {
    let mut vistos = std::collections::HashSet::new();
    let mut numeros = Vec::new();

    for linha in texto.lines() {
        let linha = linha.trim();
        if linha.is_empty() {
            continue;
        }

        let digitos: String = linha
            .trim_matches(|c| c == '\'' || c == '"')
            .chars()
            .filter(char::is_ascii_digit)
            .collect();

        if (8..=15).contains(&digitos.len()) && vistos.insert(digitos.clone()) {
            numeros.push(digitos);
        }
    }

    numeros
}

#[derive(Clone)]
pub struct CampaignStore {
    arquivo: JsonStore<Vec<Value>>,
    escrita: Arc<Mutex<()>>,
}

impl CampaignStore {
    pub fn new(arquivo: JsonStore<Vec<Value>>) -> Self {
        Self {
            arquivo,
            escrita: Arc::new(Mutex::new(())),
        }
    }

    // Entradas que não parseiam são descartadas; o totalNumbers derivado é
    // recalculado caso o arquivo tenha sido editado na mão.
    async fn carregar(&self) -> Vec<Campanha> {
        let bruto = self.arquivo.read().await;
        let total = bruto.len();

        let validas: Vec<Campanha> = bruto
            .into_iter()
            .filter_map(|valor| serde_json::from_value::<Campanha>(valor).ok())
            .filter(|c| !c.id.trim().is_empty() && !c.name.trim().is_empty())
            .map(|mut c| {
                c.total_numbers = c.phone_numbers.len();
                c
            })
            .collect();

        let descartadas = total - validas.len();
        if descartadas > 0 {
            tracing::warn!(
                descartadas,
                "Campanhas inválidas ignoradas na leitura de {}",
                self.arquivo.path().display()
            );
        }
        validas
    }

    async fn persistir(&self, campanhas: &[Campanha]) -> Result<(), AppError> {
        let valores = campanhas
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Falha ao serializar campanhas: {e}")))?;
        self.arquivo.write(&valores).await
    }

    pub async fn listar(&self) -> Vec<Campanha> {
        self.carregar().await
    }

    pub async fn criar(&self, name: &str, texto_bruto: &str) -> Result<Campanha, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Nome da campanha é obrigatório"));
        }

        let numeros = extrair_numeros(texto_bruto);
        if numeros.is_empty() {
            return Err(AppError::validation(
                "Nenhum número de telefone válido encontrado",
            ));
        }

        let _guarda = self.escrita.lock().await;
        let mut campanhas = self.carregar().await;

        // Nome único, sem diferenciar maiúsculas ("Promo" colide com "promo").
        let nome_normalizado = name.trim().to_lowercase();
        if campanhas
            .iter()
            .any(|c| c.name.to_lowercase() == nome_normalizado)
        {
            return Err(AppError::conflict("Já existe uma campanha com este nome"));
        }

        let nova = Campanha {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            total_numbers: numeros.len(),
            phone_numbers: numeros,
            created_at: Utc::now(),
        };

        campanhas.push(nova.clone());
        self.persistir(&campanhas).await?;

        tracing::info!(id = %nova.id, numeros = nova.total_numbers, "Campanha criada");
        Ok(nova)
    }

    pub async fn remover(&self, id: &str) -> Result<(), AppError> {
        let _guarda = self.escrita.lock().await;
        let mut campanhas = self.carregar().await;

        let posicao = campanhas
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| AppError::not_found("Campanha não encontrada"))?;

        campanhas.remove(posicao);
        self.persistir(&campanhas).await?;

        tracing::info!(id, "Campanha excluída");
        Ok(())
    }
}

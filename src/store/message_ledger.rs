// src/store/message_ledger.rs
//
// O razão de envios: cada disparo vira um registro no histórico e
// incrementa os acumulados (globais, por instância, por template e por
// dia) do mensagens.json. O histórico é um FIFO de no máximo 1000
// entradas — passou disso, a mais antiga sai.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    common::{error::AppError, json_store::JsonStore},
    models::mensagens::{ArquivoMensagens, EstatisticasMensagens, RegistroMensagem},
};

const LIMITE_HISTORICO: usize = 1000;

#[derive(Clone)]
pub struct MessageLedger {
    arquivo: JsonStore<ArquivoMensagens>,
    escrita: Arc<Mutex<()>>,
}

impl MessageLedger {
    pub fn new(arquivo: JsonStore<ArquivoMensagens>) -> Self {
        Self {
            arquivo,
            escrita: Arc::new(Mutex::new(())),
        }
    }

    pub async fn registrar(
        &self,
        instancia_id: &str,
        template_id: Option<&str>,
        template_name: Option<&str>,
        success: bool,
        error: Option<&str>,
    ) -> Result<(), AppError> {
        let _guarda = self.escrita.lock().await;
        let mut dados = self.arquivo.read().await;

        let agora = Utc::now();
        let hoje = agora.format("%Y-%m-%d").to_string();

        let estatisticas = &mut dados.estatisticas;
        estatisticas.total_enviadas += 1;
        if success {
            estatisticas.total_sucesso += 1;
        } else {
            estatisticas.total_erro += 1;
        }
        estatisticas.ultima_atualizacao = Some(agora);

        estatisticas
            .por_instancia
            .entry(instancia_id.to_string())
            .or_default()
            .registrar(success);

        if let Some(template_id) = template_id {
            let contador = estatisticas
                .por_template
                .entry(template_id.to_string())
                .or_default();
            if contador.nome.is_none() {
                contador.nome = template_name.map(str::to_string);
            }
            contador.registrar(success);
        }

        estatisticas
            .por_dia
            .entry(hoje)
            .or_default()
            .registrar(success);

        dados.historico.push(RegistroMensagem {
            timestamp: agora,
            instancia_id: instancia_id.to_string(),
            template_id: template_id.map(str::to_string),
            template_name: template_name.map(str::to_string),
            success,
            error: error.map(str::to_string),
        });

        // Estourou o teto: corta pelo começo (as mais antigas).
        if dados.historico.len() > LIMITE_HISTORICO {
            let excesso = dados.historico.len() - LIMITE_HISTORICO;
            dados.historico.drain(..excesso);
        }

        self.arquivo.write(&dados).await
    }

    pub async fn estatisticas(&self) -> EstatisticasMensagens {
        self.arquivo.read().await.estatisticas
    }

    // As `limite` entradas mais recentes, da mais nova para a mais velha.
    pub async fn historico(&self, limite: usize) -> Vec<RegistroMensagem> {
        let dados = self.arquivo.read().await;
        dados
            .historico
            .into_iter()
            .rev()
            .take(limite)
            .collect()
    }
}

// src/store/instance_store.rs
//
// A lista durável de instâncias + o token da conta, espelhando o
// instances.json. A disciplina aqui é "recarrega antes de usar": toda
// operação relê o arquivo, então edições feitas na mão pelo operador são
// enxergadas na chamada seguinte. As mutações seguram um Mutex do
// recarregamento até o persist, para dois `adicionar` simultâneos com o
// mesmo id não passarem os dois pela checagem de unicidade.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    common::{error::AppError, json_store::JsonStore},
    models::instancia::{ArquivoConfig, Instancia},
};

#[derive(Clone)]
pub struct InstanceStore {
    arquivo: JsonStore<ArquivoConfig>,
    // Fallback para quando o arquivo ainda não existe ou veio sem token.
    token_padrao: String,
    escrita: Arc<Mutex<()>>,
}

impl InstanceStore {
    pub fn new(arquivo: JsonStore<ArquivoConfig>, token_padrao: String) -> Self {
        Self {
            arquivo,
            token_padrao,
            escrita: Arc::new(Mutex::new(())),
        }
    }

    async fn carregar(&self) -> ArquivoConfig {
        let mut config = self.arquivo.read().await;
        if config.token_conta.trim().is_empty() {
            config.token_conta = self.token_padrao.clone();
        }
        config
    }

    async fn persistir(&self, config: &ArquivoConfig) -> Result<(), AppError> {
        self.arquivo
            .write(config)
            .await
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Erro ao salvar configuração")))
    }

    pub async fn listar(&self) -> Vec<Instancia> {
        self.carregar().await.instancias
    }

    pub async fn token_conta(&self) -> String {
        self.carregar().await.token_conta
    }

    pub async fn buscar(&self, id: &str) -> Option<Instancia> {
        self.carregar()
            .await
            .instancias
            .into_iter()
            .find(|i| i.id == id)
    }

    pub async fn adicionar(
        &self,
        id: &str,
        token: &str,
        name: Option<String>,
    ) -> Result<Instancia, AppError> {
        let _guarda = self.escrita.lock().await;
        let mut config = self.carregar().await;

        if config.instancias.iter().any(|i| i.id == id) {
            return Err(AppError::conflict("Esta instância já está configurada"));
        }

        let nova = Instancia {
            id: id.to_string(),
            token: token.to_string(),
            name,
        };
        config.instancias.push(nova.clone());
        self.persistir(&config).await?;

        tracing::info!(id = %nova.id, "Instância adicionada");
        Ok(nova)
    }

    // Só os campos fornecidos são sobrescritos; os demais ficam como estão.
    pub async fn atualizar(
        &self,
        id: &str,
        novo_id: Option<String>,
        novo_token: Option<String>,
        novo_nome: Option<String>,
    ) -> Result<Instancia, AppError> {
        let _guarda = self.escrita.lock().await;
        let mut config = self.carregar().await;

        let posicao = config
            .instancias
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| AppError::not_found("Instância não encontrada"))?;

        if let Some(novo_id) = &novo_id {
            if novo_id != id {
                // O novo id não pode colidir com outro registro.
                if config.instancias.iter().any(|i| i.id == *novo_id) {
                    return Err(AppError::conflict("Esta instância já está configurada"));
                }
                config.instancias[posicao].id = novo_id.clone();
            }
        }
        if let Some(novo_token) = novo_token {
            config.instancias[posicao].token = novo_token;
        }
        if let Some(novo_nome) = novo_nome {
            config.instancias[posicao].name = Some(novo_nome);
        }

        self.persistir(&config).await?;

        let atualizada = config.instancias[posicao].clone();
        tracing::info!(id = %atualizada.id, "Instância atualizada");
        Ok(atualizada)
    }

    pub async fn remover(&self, id: &str) -> Result<Instancia, AppError> {
        let _guarda = self.escrita.lock().await;
        let mut config = self.carregar().await;

        let posicao = config
            .instancias
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| AppError::not_found("Instância não encontrada"))?;

        let removida = config.instancias.remove(posicao);
        self.persistir(&config).await?;

        tracing::info!(id = %removida.id, "Instância removida");
        Ok(removida)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loja(dir: &tempfile::TempDir) -> InstanceStore {
        InstanceStore::new(
            JsonStore::new(dir.path().join("instances.json")),
            "TOKEN-PADRAO".into(),
        )
    }

    #[tokio::test]
    async fn adicionar_e_listar() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);

        store.adicionar("ID-1", "TOK-1", None).await.unwrap();
        let lista = store.listar().await;

        assert_eq!(lista.len(), 1);
        assert_eq!(lista[0].id, "ID-1");
        assert_eq!(lista[0].token, "TOK-1");
    }

    #[tokio::test]
    async fn adicionar_duplicado_falha_e_nao_muda_nada() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);

        store
            .adicionar("ID-1", "TOK-1", Some("Primeira".into()))
            .await
            .unwrap();
        let erro = store.adicionar("ID-1", "TOK-OUTRO", None).await.unwrap_err();
        assert!(matches!(erro, AppError::Conflict(_)));

        // O registro original continua intacto, e só ele.
        let lista = store.listar().await;
        assert_eq!(lista.len(), 1);
        assert_eq!(lista[0].token, "TOK-1");
    }

    #[tokio::test]
    async fn atualizar_so_toca_nos_campos_fornecidos() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);
        store
            .adicionar("ID-1", "TOK-1", Some("Apelido".into()))
            .await
            .unwrap();

        let atualizada = store
            .atualizar("ID-1", None, Some("TOK-2".into()), None)
            .await
            .unwrap();

        assert_eq!(atualizada.id, "ID-1");
        assert_eq!(atualizada.token, "TOK-2");
        assert_eq!(atualizada.name.as_deref(), Some("Apelido"));
    }

    #[tokio::test]
    async fn atualizar_inexistente_da_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);

        let erro = store
            .atualizar("FANTASMA", None, Some("TOK".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(erro, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn atualizar_para_id_de_outro_registro_da_conflito() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);
        store.adicionar("ID-1", "TOK-1", None).await.unwrap();
        store.adicionar("ID-2", "TOK-2", None).await.unwrap();

        let erro = store
            .atualizar("ID-1", Some("ID-2".into()), None, None)
            .await
            .unwrap_err();
        assert!(matches!(erro, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn remover_devolve_o_registro_removido() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);
        store
            .adicionar("ID-1", "TOK-1", Some("Alvo".into()))
            .await
            .unwrap();

        let removida = store.remover("ID-1").await.unwrap();
        assert_eq!(removida.name.as_deref(), Some("Alvo"));
        assert!(store.listar().await.is_empty());

        let erro = store.remover("ID-1").await.unwrap_err();
        assert!(matches!(erro, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn token_da_conta_cai_no_padrao_sem_arquivo() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);
        assert_eq!(store.token_conta().await, "TOKEN-PADRAO");
    }

    #[tokio::test]
    async fn edicao_externa_do_arquivo_aparece_na_proxima_leitura() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);
        store.adicionar("ID-1", "TOK-1", None).await.unwrap();

        // Operador edita o arquivo por fora do processo.
        let caminho = dir.path().join("instances.json");
        tokio::fs::write(
            &caminho,
            serde_json::to_vec_pretty(&serde_json::json!({
                "TOKEN_CONTA": "TOKEN-NOVO",
                "INSTANCIAS": [{ "id": "ID-EXTERNO", "token": "TOK-X" }]
            }))
            .unwrap(),
        )
        .await
        .unwrap();

        let lista = store.listar().await;
        assert_eq!(lista.len(), 1);
        assert_eq!(lista[0].id, "ID-EXTERNO");
        assert_eq!(store.token_conta().await, "TOKEN-NOVO");
    }
}

// src/common/json_store.rs
//
// Persistência genérica em JSON: um arquivo por loja, legível por humanos
// (pretty-print) para o operador poder inspecionar/editar na mão.
//
// A escrita é atômica: serializa num arquivo temporário no MESMO diretório
// e depois renomeia por cima do alvo. Um leitor concorrente (ou um crash no
// meio da escrita) nunca enxerga um arquivo pela metade — ou vê o estado
// antigo completo, ou o novo completo.

use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};

use crate::common::error::AppError;

pub struct JsonStore<T> {
    path: PathBuf,
    // `fn() -> T` para manter Send + Sync independente de T.
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonStore<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Arquivo ausente, ilegível ou com JSON quebrado vira o estado padrão:
    // quem chama precisa tolerar uma loja vazia.
    pub async fn read(&self) -> T {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(_) => return T::default(),
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    arquivo = %self.path.display(),
                    "Arquivo JSON inválido, usando estado padrão: {}",
                    e
                );
                T::default()
            }
        }
    }

    pub async fn write(&self, value: &T) -> Result<(), AppError> {
        if let Some(pai) = self.path.parent() {
            tokio::fs::create_dir_all(pai)
                .await
                .with_context(|| format!("Falha ao criar diretório {}", pai.display()))?;
        }

        let json = serde_json::to_vec_pretty(value)
            .context("Falha ao serializar estado para JSON")?;

        // Temporário no mesmo diretório: rename entre filesystems não é atômico.
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("Falha ao escrever {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Falha ao renomear {} -> {}", tmp.display(), self.path.display()))?;

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut os = self.path.as_os_str().to_owned();
        os.push(".tmp");
        PathBuf::from(os)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    struct Estado {
        itens: Vec<String>,
    }

    #[tokio::test]
    async fn arquivo_ausente_vira_padrao() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonStore<Estado> = JsonStore::new(dir.path().join("nada.json"));
        assert_eq!(store.read().await, Estado::default());
    }

    #[tokio::test]
    async fn json_quebrado_vira_padrao() {
        let dir = tempfile::tempdir().unwrap();
        let caminho = dir.path().join("quebrado.json");
        tokio::fs::write(&caminho, b"{ isso nao eh json").await.unwrap();

        let store: JsonStore<Estado> = JsonStore::new(&caminho);
        assert_eq!(store.read().await, Estado::default());
    }

    #[tokio::test]
    async fn escreve_e_le_de_volta() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonStore<Estado> = JsonStore::new(dir.path().join("estado.json"));

        let estado = Estado {
            itens: vec!["a".into(), "b".into()],
        };
        store.write(&estado).await.unwrap();
        assert_eq!(store.read().await, estado);

        // O temporário não pode sobrar depois do rename.
        assert!(!store.tmp_path().exists());
    }

    #[tokio::test]
    async fn escrita_cria_diretorio() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonStore<Estado> =
            JsonStore::new(dir.path().join("sub").join("fundo").join("estado.json"));
        store.write(&Estado::default()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn crash_entre_temporario_e_rename_preserva_o_conteudo_antigo() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonStore<Estado> = JsonStore::new(dir.path().join("estado.json"));

        let antigo = Estado {
            itens: vec!["antigo".into()],
        };
        store.write(&antigo).await.unwrap();

        // Simula um crash: o temporário foi escrito (e pela metade), mas o
        // rename nunca aconteceu. O alvo precisa continuar íntegro.
        tokio::fs::write(store.tmp_path(), b"{ \"itens\": [\"nov").await.unwrap();

        assert_eq!(store.read().await, antigo);

        // E a próxima escrita bem-sucedida passa por cima do lixo.
        let novo = Estado {
            itens: vec!["novo".into()],
        };
        store.write(&novo).await.unwrap();
        assert_eq!(store.read().await, novo);
    }
}

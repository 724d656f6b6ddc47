// src/store/template_store.rs
//
// CRUD dos templates em cima do templates.json. Dois formatos convivem no
// mesmo arquivo: o template de imagem (nome/url, o formato antigo) e o de
// mensagem (name/message + mídia/botões/perfil). Entrada que não bate com
// nenhum dos dois é lixo: sai da visão na leitura e some do arquivo na
// próxima escrita bem-sucedida.

use std::{path::PathBuf, sync::Arc};

use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    common::{error::AppError, json_store::JsonStore},
    models::template::{
        ArquivoTemplates, Midia, Perfil, Template, TemplateImagem, TemplateMensagem,
    },
};

// Descritor de um arquivo que a camada de upload já resolveu e gravou.
#[derive(Debug, Clone)]
pub struct ArquivoEnviado {
    pub url: String,
    pub nome_original: String,
    pub tamanho_bytes: u64,
}

// A mídia como chega do painel: tipo + no máximo uma das três fontes.
// A precedência na resolução é upload novo > URL nova > mídia existente.
#[derive(Debug, Clone, Default)]
pub struct EntradaMidia {
    pub tipo: Option<String>,
    pub upload: Option<ArquivoEnviado>,
    pub url: Option<String>,
    pub existente: Option<Midia>,
}

#[derive(Debug, Clone, Default)]
pub struct NovoTemplate {
    // Campos do template de imagem.
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub url: Option<String>,

    // Campos do template de mensagem.
    pub name: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub footer: Option<String>,
    pub buttons: Vec<Value>,
    pub profile: Perfil,
    pub midia: EntradaMidia,
}

#[derive(Debug, Clone, Default)]
pub struct AtualizacaoTemplate {
    pub name: String,
    pub title: String,
    pub message: String,
    pub footer: String,
    pub buttons: Vec<Value>,
    pub profile: Perfil,
    pub midia: EntradaMidia,
}

#[derive(Clone)]
pub struct TemplateStore {
    arquivo: JsonStore<ArquivoTemplates>,
    pasta_uploads: PathBuf,
    escrita: Arc<Mutex<()>>,
}

impl TemplateStore {
    pub fn new(arquivo: JsonStore<ArquivoTemplates>, pasta_uploads: impl Into<PathBuf>) -> Self {
        Self {
            arquivo,
            pasta_uploads: pasta_uploads.into(),
            escrita: Arc::new(Mutex::new(())),
        }
    }

    // Lê o arquivo e filtra entrada por entrada. Entradas inválidas são
    // descartadas da visão (higiene de dados), com o total no log.
    async fn carregar(&self) -> Vec<Template> {
        let bruto = self.arquivo.read().await;
        let total = bruto.templates.len();

        let validos: Vec<Template> = bruto
            .templates
            .into_iter()
            .filter_map(|valor| serde_json::from_value::<Template>(valor).ok())
            .filter(Template::valido)
            .collect();

        let descartados = total - validos.len();
        if descartados > 0 {
            tracing::warn!(
                descartados,
                "Templates inválidos ignorados na leitura de {}",
                self.arquivo.path().display()
            );
        }
        validos
    }

    async fn persistir(&self, templates: &[Template]) -> Result<(), AppError> {
        let valores = templates
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Falha ao serializar templates: {e}")))?;
        self.arquivo
            .write(&ArquivoTemplates { templates: valores })
            .await
    }

    pub async fn listar(&self) -> Vec<Template> {
        self.carregar().await
    }

    // A presença de (name, message) decide a variante, como no painel:
    // com os dois vira template de mensagem, senão cai no fluxo de imagem.
    pub async fn criar(&self, dados: NovoTemplate) -> Result<Template, AppError> {
        let _guarda = self.escrita.lock().await;
        let mut templates = self.carregar().await;

        let novo = if dados.name.is_some() && dados.message.is_some() {
            let name = dados.name.as_deref().unwrap_or_default();
            if templates
                .iter()
                .any(|t| matches!(t, Template::Mensagem(m) if m.name == name.trim()))
            {
                return Err(AppError::conflict("Já existe um template com este nome"));
            }

            Template::Mensagem(TemplateMensagem::novo(
                name,
                dados.title.as_deref().unwrap_or_default(),
                dados.message.as_deref().unwrap_or_default(),
                dados.footer.as_deref().unwrap_or_default(),
                resolver_midia(&dados.midia),
                dados.buttons,
                dados.profile,
            )?)
        } else {
            let nome = dados
                .nome
                .as_deref()
                .ok_or_else(|| AppError::validation("Nome do template é obrigatório"))?;
            // A imagem pode vir de um upload já resolvido ou de uma URL direta.
            let url = dados
                .midia
                .upload
                .as_ref()
                .map(|u| u.url.clone())
                .or(dados.url.clone())
                .ok_or_else(|| AppError::validation("Imagem é obrigatória"))?;

            if templates
                .iter()
                .any(|t| matches!(t, Template::Imagem(i) if i.nome == nome.trim()))
            {
                return Err(AppError::conflict("Já existe um template com este nome"));
            }

            Template::Imagem(TemplateImagem::novo(
                nome,
                dados.descricao.as_deref().unwrap_or_default(),
                &url,
            )?)
        };

        templates.push(novo.clone());
        self.persistir(&templates).await?;

        tracing::info!(id = %novo.id(), chave = %novo.chave(), "Template criado");
        Ok(novo)
    }

    // Só templates de mensagem são atualizáveis; o formato de imagem é
    // imutável (o painel recria em vez de editar).
    pub async fn atualizar(
        &self,
        id: &str,
        dados: AtualizacaoTemplate,
    ) -> Result<Template, AppError> {
        if dados.name.trim().is_empty() || dados.message.trim().is_empty() {
            return Err(AppError::validation("Nome e mensagem são obrigatórios"));
        }

        let _guarda = self.escrita.lock().await;
        let mut templates = self.carregar().await;

        let posicao = templates
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| AppError::not_found("Template não encontrado"))?;

        let Template::Mensagem(existente) = &templates[posicao] else {
            return Err(AppError::validation(
                "Apenas templates de mensagem podem ser atualizados",
            ));
        };

        let atualizado = TemplateMensagem {
            id: existente.id.clone(),
            name: dados.name.trim().to_string(),
            title: dados.title.trim().to_string(),
            message: dados.message.trim().to_string(),
            footer: dados.footer.trim().to_string(),
            media: resolver_midia(&dados.midia),
            buttons: dados.buttons,
            profile: dados.profile,
            created_at: existente.created_at,
            updated_at: chrono::Utc::now(),
        };

        templates[posicao] = Template::Mensagem(atualizado);
        self.persistir(&templates).await?;

        tracing::info!(id, "Template atualizado");
        Ok(templates[posicao].clone())
    }

    pub async fn remover(&self, id: &str) -> Result<String, AppError> {
        let _guarda = self.escrita.lock().await;
        let mut templates = self.carregar().await;

        let posicao = templates
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| AppError::not_found("Template não encontrado"))?;

        let removido = templates.remove(posicao);
        self.persistir(&templates).await?;

        // Melhor esforço: tenta apagar o arquivo de mídia que subiu junto.
        // Falha aqui não desfaz o delete.
        if let Some(nome_arquivo) = arquivo_de_upload(&removido) {
            let caminho = self.pasta_uploads.join(nome_arquivo);
            if let Err(e) = tokio::fs::remove_file(&caminho).await {
                tracing::warn!(
                    "Não foi possível apagar o arquivo físico {}: {}",
                    caminho.display(),
                    e
                );
            }
        }

        tracing::info!(id, "Template excluído");
        Ok(removido.id().to_string())
    }
}

fn resolver_midia(entrada: &EntradaMidia) -> Midia {
    let tipo = match entrada.tipo.as_deref() {
        Some(tipo) if tipo != "none" => tipo.to_string(),
        _ => return Midia::default(),
    };

    if let Some(upload) = &entrada.upload {
        return Midia {
            tipo: Some(tipo),
            url: Some(upload.url.clone()),
            filename: Some(upload.nome_original.clone()),
            size: Some(formatar_tamanho(upload.tamanho_bytes)),
        };
    }

    if let Some(url) = entrada.url.as_deref().filter(|u| !u.is_empty()) {
        return Midia {
            tipo: Some(tipo),
            url: Some(url.to_string()),
            filename: Some(nome_do_arquivo_na_url(url)),
            size: Some("URL Externa".to_string()),
        };
    }

    if let Some(existente) = &entrada.existente {
        return existente.clone();
    }

    Midia::default()
}

fn nome_do_arquivo_na_url(url: &str) -> String {
    url.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("imagem.jpg")
        .to_string()
}

// O nome do arquivo em uploads/ associado ao template, quando houver.
// "URL Externa" não tem arquivo local.
fn arquivo_de_upload(template: &Template) -> Option<String> {
    match template {
        Template::Imagem(t) => Some(nome_do_arquivo_na_url(&t.url)),
        Template::Mensagem(t) => {
            if t.media.size.as_deref() == Some("URL Externa") {
                return None;
            }
            t.media.url.as_deref().map(nome_do_arquivo_na_url)
        }
    }
}

// 1024 em 1024, duas casas no máximo, sem zeros à direita (igual ao
// parseFloat do painel: 1.00 MB vira "1 MB").
pub fn formatar_tamanho(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNIDADES: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let expoente = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
    let expoente = expoente.min(UNIDADES.len() - 1);
    let valor = bytes as f64 / 1024_f64.powi(expoente as i32);

    let texto = format!("{valor:.2}");
    let texto = texto.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", texto, UNIDADES[expoente])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loja(dir: &tempfile::TempDir) -> TemplateStore {
        TemplateStore::new(
            JsonStore::new(dir.path().join("templates.json")),
            dir.path().join("uploads"),
        )
    }

    fn novo_de_mensagem(name: &str) -> NovoTemplate {
        NovoTemplate {
            name: Some(name.to_string()),
            message: Some("Olá {{nome}}!".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn cria_template_de_mensagem() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);

        let criado = store.criar(novo_de_mensagem("Boas-vindas")).await.unwrap();
        assert!(matches!(&criado, Template::Mensagem(m) if m.name == "Boas-vindas"));

        let lista = store.listar().await;
        assert_eq!(lista.len(), 1);
    }

    #[tokio::test]
    async fn cria_template_de_imagem_e_valida_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);

        let erro = store
            .criar(NovoTemplate {
                nome: Some("Banner".into()),
                url: Some("ftp://servidor/banner.png".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(erro, AppError::Validation(_)));

        let criado = store
            .criar(NovoTemplate {
                nome: Some("Banner".into()),
                descricao: Some("Promo de natal".into()),
                url: Some("https://cdn.exemplo.com/banner.png".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(matches!(&criado, Template::Imagem(i) if i.nome == "Banner"));
    }

    #[tokio::test]
    async fn nome_duplicado_da_conflito() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);
        store.criar(novo_de_mensagem("Promo")).await.unwrap();

        let erro = store.criar(novo_de_mensagem("Promo")).await.unwrap_err();
        assert!(matches!(erro, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn campos_obrigatorios_em_branco_dao_validation() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);

        let erro = store
            .criar(NovoTemplate {
                name: Some("  ".into()),
                message: Some("corpo".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(erro, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn entradas_corrompidas_sao_descartadas_na_leitura() {
        let dir = tempfile::tempdir().unwrap();
        let caminho = dir.path().join("templates.json");
        tokio::fs::write(
            &caminho,
            serde_json::to_vec_pretty(&json!({
                "templates": [
                    { "id": "1", "name": "Ok", "message": "corpo",
                      "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z" },
                    { "id": "2" },
                    { "qualquer": "coisa" },
                    { "id": "3", "nome": "SemUrlValida", "url": "nada",
                      "createdAt": "2024-01-01T00:00:00Z" }
                ]
            }))
            .unwrap(),
        )
        .await
        .unwrap();

        let store = TemplateStore::new(JsonStore::new(&caminho), dir.path().join("uploads"));
        let lista = store.listar().await;

        assert_eq!(lista.len(), 1);
        assert_eq!(lista[0].chave(), "Ok");
    }

    #[tokio::test]
    async fn registro_editado_na_mao_sem_timestamps_e_mantido() {
        let dir = tempfile::tempdir().unwrap();
        let caminho = dir.path().join("templates.json");
        // Operador escreveu só o essencial de cada variante, sem createdAt.
        tokio::fs::write(
            &caminho,
            serde_json::to_vec_pretty(&json!({
                "templates": [
                    { "id": "1", "name": "Editado na mão", "message": "corpo" },
                    { "id": "2", "nome": "Banner antigo", "url": "https://cdn.exemplo.com/banner.png" }
                ]
            }))
            .unwrap(),
        )
        .await
        .unwrap();

        let store = TemplateStore::new(JsonStore::new(&caminho), dir.path().join("uploads"));
        let lista = store.listar().await;

        assert_eq!(lista.len(), 2);
        assert_eq!(lista[0].chave(), "Editado na mão");
        assert_eq!(lista[1].chave(), "Banner antigo");
    }

    #[tokio::test]
    async fn atualizar_segue_a_precedencia_de_midia() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);
        let criado = store.criar(novo_de_mensagem("ComMidia")).await.unwrap();

        // Upload novo ganha da URL nova e da mídia existente.
        let atualizado = store
            .atualizar(
                criado.id(),
                AtualizacaoTemplate {
                    name: "ComMidia".into(),
                    message: "novo corpo".into(),
                    midia: EntradaMidia {
                        tipo: Some("image".into()),
                        upload: Some(ArquivoEnviado {
                            url: "https://painel/uploads/imagens/a.png".into(),
                            nome_original: "a.png".into(),
                            tamanho_bytes: 2048,
                        }),
                        url: Some("https://cdn/b.png".into()),
                        existente: Some(Midia {
                            tipo: Some("image".into()),
                            url: Some("https://cdn/velha.png".into()),
                            filename: Some("velha.png".into()),
                            size: Some("URL Externa".into()),
                        }),
                    },
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let Template::Mensagem(m) = atualizado else {
            panic!("esperava template de mensagem");
        };
        assert_eq!(m.media.filename.as_deref(), Some("a.png"));
        assert_eq!(m.media.size.as_deref(), Some("2 KB"));

        // Sem upload e sem URL, mantém a existente.
        let mantido = store
            .atualizar(
                &m.id,
                AtualizacaoTemplate {
                    name: "ComMidia".into(),
                    message: "outro corpo".into(),
                    midia: EntradaMidia {
                        tipo: Some("image".into()),
                        existente: Some(m.media.clone()),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let Template::Mensagem(m2) = mantido else {
            panic!("esperava template de mensagem");
        };
        assert_eq!(m2.media, m.media);
        assert!(m2.updated_at >= m.updated_at);
        assert_eq!(m2.created_at, m.created_at);
    }

    #[tokio::test]
    async fn remover_some_com_o_registro_mesmo_sem_arquivo_fisico() {
        let dir = tempfile::tempdir().unwrap();
        let store = loja(&dir);
        let criado = store
            .criar(NovoTemplate {
                nome: Some("Banner".into()),
                url: Some("https://painel/uploads/imagens/banner.png".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        // O arquivo físico nunca existiu; o delete segue valendo.
        let id = store.remover(criado.id()).await.unwrap();
        assert_eq!(id, criado.id());
        assert!(store.listar().await.is_empty());

        let erro = store.remover(&id).await.unwrap_err();
        assert!(matches!(erro, AppError::NotFound(_)));
    }

    #[test]
    fn formatar_tamanho_como_o_painel() {
        assert_eq!(formatar_tamanho(0), "0 Bytes");
        assert_eq!(formatar_tamanho(512), "512 Bytes");
        assert_eq!(formatar_tamanho(2048), "2 KB");
        assert_eq!(formatar_tamanho(1_572_864), "1.5 MB");
    }
}

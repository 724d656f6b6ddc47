// src/services/status.rs
//
// O agregador da frota: pergunta à Z-API o status e as estatísticas de
// cada instância cadastrada e monta o resumo que o dashboard exibe.
//
// Nem todo `error` da Z-API é falha de verdade. "You are not connected."
// é só o estado normal de uma instância aguardando QR code, e o
// "NOT_FOUND" das estatísticas significa que ainda não há número pareado.
// Falha de verdade (timeout, HTTP != 200, erro inesperado) marca a
// instância como errada e segue para a próxima — uma instância travada
// nunca derruba a agregação das demais.

use crate::{
    common::error::AppError,
    models::{
        instancia::Instancia,
        status::{EstatisticasFrota, InstanciaStatus, PainelInstancias},
    },
    services::zapi::{ZapiClient, ZapiResponse},
    store::InstanceStore,
};

// Estados de conexão que a Z-API devolve no campo `error` do /status.
const SINAIS_DE_CONEXAO: [&str; 3] = [
    "You are not connected.",
    "You need to restore the session.",
    "You are already connected.",
];

// Respostas do /statistics que significam "sem estatísticas ainda".
const SINAIS_SEM_ESTATISTICAS: [&str; 2] =
    ["NOT_FOUND", "Unable to find matching target resource method"];

#[derive(Clone)]
pub struct StatusService {
    zapi: ZapiClient,
    instancias: InstanceStore,
}

impl StatusService {
    pub fn new(zapi: ZapiClient, instancias: InstanceStore) -> Self {
        Self { zapi, instancias }
    }

    // Percorre as instâncias em sequência; para cada uma, as duas chamadas
    // (status + statistics) saem juntas e as duas precisam resolver antes
    // de fechar a linha.
    pub async fn agregar(&self) -> PainelInstancias {
        let instancias = self.instancias.listar().await;
        let token_conta = self.instancias.token_conta().await;

        let mut linhas = Vec::with_capacity(instancias.len());
        for (indice, instancia) in instancias.iter().enumerate() {
            // Registro malformado no arquivo: pula sem contar.
            if instancia.id.trim().is_empty() || instancia.token.trim().is_empty() {
                continue;
            }

            let (status, estatisticas) = tokio::join!(
                self.zapi.status(instancia, &token_conta),
                self.zapi.statistics(instancia, &token_conta)
            );

            let linha = avaliar_instancia(indice, instancia, &status, &estatisticas);
            if let Some(erro) = &linha.error {
                tracing::warn!(id = %instancia.id, "Instância com erro na Z-API: {}", erro);
            }
            linhas.push(linha);
        }

        let statistics = resumir(&linhas);
        PainelInstancias {
            instances: linhas,
            account_token: token_conta,
            statistics,
        }
    }

    // Tenta gerar um código de pareamento: percorre as instâncias e usa a
    // primeira desconectada que devolver um código.
    pub async fn gerar_codigo(&self, telefone: &str) -> Result<(String, String), AppError> {
        let instancias = self.instancias.listar().await;
        let token_conta = self.instancias.token_conta().await;

        for instancia in &instancias {
            let info = self.zapi.info(instancia, &token_conta).await;
            if info.tem_erro() {
                continue;
            }

            // Instância já conectada não gera código de pareamento.
            if info.connected_explicito() == Some(false) {
                let resposta = self.zapi.gerar_codigo(instancia, telefone, &token_conta).await;
                if !resposta.tem_erro() {
                    if let Some(codigo) = resposta.code() {
                        return Ok((codigo, instancia.id.clone()));
                    }
                }
            }
        }

        Err(AppError::upstream(
            "Nenhuma instância disponível ou erro ao gerar o código",
        ))
    }

    pub async fn verificar_conexao(&self, instance_id: &str) -> Result<bool, AppError> {
        let instancia = self
            .instancias
            .buscar(instance_id)
            .await
            .ok_or_else(|| AppError::not_found("Instância não encontrada"))?;

        let token_conta = self.instancias.token_conta().await;
        let info = self.zapi.info(&instancia, &token_conta).await;

        if info.tem_erro() {
            return Err(AppError::upstream(format!(
                "Erro ao verificar o status da instância: {}",
                info.mensagem().unwrap_or("Erro desconhecido")
            )));
        }

        info.connected_explicito().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Resposta inválida da API ao verificar o status da instância"
            ))
        })
    }
}

// Decide o que uma instância vira no painel a partir do par de respostas.
fn avaliar_instancia(
    indice: usize,
    instancia: &Instancia,
    status: &ZapiResponse,
    estatisticas: &ZapiResponse,
) -> InstanciaStatus {
    let nome_fallback = instancia
        .name
        .clone()
        .unwrap_or_else(|| format!("Instância {}", indice + 1));

    let sinal_de_conexao = status
        .erro_texto()
        .is_some_and(|texto| SINAIS_DE_CONEXAO.contains(&texto));
    let sem_estatisticas = estatisticas
        .erro_texto()
        .is_some_and(|texto| SINAIS_SEM_ESTATISTICAS.contains(&texto));

    let erro_real = (status.tem_erro() && !sinal_de_conexao)
        || (estatisticas.tem_erro() && !sem_estatisticas);

    if erro_real {
        return InstanciaStatus {
            id: instancia.id.clone(),
            token: instancia.token.clone(),
            name: nome_fallback,
            phone_number: "N/A".to_string(),
            connected: false,
            messages: 0,
            contacts: 0,
            qr_code: None,
            last_activity: "N/A".to_string(),
            battery_level: None,
            error: Some(
                status
                    .mensagem()
                    .or_else(|| estatisticas.mensagem())
                    .unwrap_or("Erro desconhecido")
                    .to_string(),
            ),
        };
    }

    let (messages, contacts) = if sem_estatisticas {
        (0, 0)
    } else {
        (estatisticas.messages(), estatisticas.contacts())
    };

    InstanciaStatus {
        id: instancia.id.clone(),
        token: instancia.token.clone(),
        name: status.name().unwrap_or(nome_fallback),
        phone_number: status.phone_number().unwrap_or_else(|| "N/A".to_string()),
        connected: status.connected(),
        messages,
        contacts,
        qr_code: status.qr_code(),
        last_activity: status.last_activity().unwrap_or_else(|| "N/A".to_string()),
        battery_level: status.battery_level(),
        error: None,
    }
}

fn resumir(linhas: &[InstanciaStatus]) -> EstatisticasFrota {
    let mut resumo = EstatisticasFrota {
        total_instances: linhas.len(),
        active_instances: 0,
        inactive_instances: 0,
        error_instances: 0,
        total_messages: 0,
        total_contacts: 0,
        qr_instances: 0,
        active_percentage: 0.0,
    };

    for linha in linhas {
        if linha.connected {
            resumo.active_instances += 1;
            resumo.total_messages += linha.messages;
            resumo.total_contacts += linha.contacts;
        } else {
            resumo.inactive_instances += 1;
            if linha.error.is_some() {
                resumo.error_instances += 1;
            } else if linha.qr_code.is_some() {
                resumo.qr_instances += 1;
            }
        }
    }

    if resumo.total_instances > 0 {
        let bruto = resumo.active_instances as f64 / resumo.total_instances as f64 * 100.0;
        resumo.active_percentage = (bruto * 10.0).round() / 10.0;
    }

    resumo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::json_store::JsonStore;
    use axum::{Json, Router, extract::Path, routing::get};
    use serde_json::json;

    fn instancia(id: &str) -> Instancia {
        Instancia {
            id: id.to_string(),
            token: format!("token-{id}"),
            name: None,
        }
    }

    #[test]
    fn sinal_de_conexao_nao_e_erro() {
        let status = ZapiResponse(json!({ "error": "You are not connected.", "qrCode": "data:..." }));
        let estatisticas = ZapiResponse(json!({ "error": "NOT_FOUND" }));

        let linha = avaliar_instancia(0, &instancia("A"), &status, &estatisticas);

        assert!(linha.error.is_none());
        assert!(!linha.connected);
        assert_eq!(linha.messages, 0);
        assert_eq!(linha.qr_code.as_deref(), Some("data:..."));
    }

    #[test]
    fn erro_real_zera_os_campos() {
        let status = ZapiResponse::erro("Request timeout");
        let estatisticas = ZapiResponse(json!({ "messages": 99, "contacts": 5 }));

        let linha = avaliar_instancia(2, &instancia("B"), &status, &estatisticas);

        assert_eq!(linha.error.as_deref(), Some("Request timeout"));
        assert!(!linha.connected);
        assert_eq!(linha.messages, 0);
        assert_eq!(linha.contacts, 0);
        assert_eq!(linha.phone_number, "N/A");
        assert_eq!(linha.name, "Instância 3");
    }

    #[test]
    fn instancia_conectada_usa_os_numeros_das_estatisticas() {
        let status = ZapiResponse(json!({
            "connected": true,
            "phoneNumber": "5511912345678",
            "name": "Vendas"
        }));
        let estatisticas = ZapiResponse(json!({ "messages": 120, "contacts": 34 }));

        let linha = avaliar_instancia(0, &instancia("C"), &status, &estatisticas);

        assert!(linha.connected);
        assert_eq!(linha.messages, 120);
        assert_eq!(linha.contacts, 34);
        assert_eq!(linha.name, "Vendas");
        assert_eq!(linha.phone_number, "5511912345678");
    }

    #[test]
    fn resumo_mantem_ativo_mais_inativo_igual_ao_total() {
        let linhas = vec![
            InstanciaStatus {
                id: "A".into(),
                token: "t".into(),
                name: "A".into(),
                phone_number: "N/A".into(),
                connected: true,
                messages: 10,
                contacts: 3,
                qr_code: None,
                last_activity: "N/A".into(),
                battery_level: None,
                error: None,
            },
            InstanciaStatus {
                id: "B".into(),
                token: "t".into(),
                name: "B".into(),
                phone_number: "N/A".into(),
                connected: false,
                messages: 0,
                contacts: 0,
                qr_code: Some("qr".into()),
                last_activity: "N/A".into(),
                battery_level: None,
                error: None,
            },
            InstanciaStatus {
                id: "C".into(),
                token: "t".into(),
                name: "C".into(),
                phone_number: "N/A".into(),
                connected: false,
                messages: 0,
                contacts: 0,
                qr_code: None,
                last_activity: "N/A".into(),
                battery_level: None,
                error: Some("Request timeout".into()),
            },
        ];

        let resumo = resumir(&linhas);

        assert_eq!(resumo.total_instances, 3);
        assert_eq!(
            resumo.active_instances + resumo.inactive_instances,
            resumo.total_instances
        );
        assert_eq!(resumo.error_instances, 1);
        assert_eq!(resumo.qr_instances, 1);
        assert_eq!(resumo.total_messages, 10);
        // 1/3 → 33.3 com uma casa decimal.
        assert_eq!(resumo.active_percentage, 33.3);
    }

    #[test]
    fn resumo_vazio_tem_percentual_zero() {
        let resumo = resumir(&[]);
        assert_eq!(resumo.total_instances, 0);
        assert_eq!(resumo.active_percentage, 0.0);
    }

    // Sobe um servidor local fingindo ser a Z-API: a instância SAUDAVEL
    // responde normal, a instância QUEBRADA devolve 500 em tudo.
    async fn zapi_de_mentira() -> String {
        async fn status(Path((id, _token)): Path<(String, String)>) -> axum::response::Response {
            use axum::response::IntoResponse;
            if id == "SAUDAVEL" {
                Json(json!({ "connected": true, "phoneNumber": "5511912345678" })).into_response()
            } else {
                (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
            }
        }
        async fn statistics(
            Path((id, _token)): Path<(String, String)>,
        ) -> axum::response::Response {
            use axum::response::IntoResponse;
            if id == "SAUDAVEL" {
                Json(json!({ "messages": 7, "contacts": 2 })).into_response()
            } else {
                (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
            }
        }

        let app = Router::new()
            .route("/instances/{id}/token/{token}/status", get(status))
            .route("/instances/{id}/token/{token}/statistics", get(statistics));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endereco = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{endereco}")
    }

    #[tokio::test]
    async fn falha_de_uma_instancia_nao_contamina_as_outras() {
        let base = zapi_de_mentira().await;
        let dir = tempfile::tempdir().unwrap();

        let instancias = InstanceStore::new(
            JsonStore::new(dir.path().join("instances.json")),
            "TOKEN".into(),
        );
        instancias.adicionar("SAUDAVEL", "tok-a", None).await.unwrap();
        instancias.adicionar("QUEBRADA", "tok-b", None).await.unwrap();

        let service = StatusService::new(ZapiClient::com_base_url(base), instancias);
        let painel = service.agregar().await;

        assert_eq!(painel.instances.len(), 2);

        let saudavel = &painel.instances[0];
        assert!(saudavel.connected);
        assert_eq!(saudavel.messages, 7);
        assert!(saudavel.error.is_none());

        let quebrada = &painel.instances[1];
        assert!(!quebrada.connected);
        assert_eq!(quebrada.error.as_deref(), Some("HTTP 500: Internal Server Error"));

        let resumo = &painel.statistics;
        assert_eq!(resumo.total_instances, 2);
        assert_eq!(resumo.active_instances, 1);
        assert_eq!(resumo.inactive_instances, 1);
        assert_eq!(resumo.error_instances, 1);
        assert_eq!(resumo.active_percentage, 50.0);
    }
}

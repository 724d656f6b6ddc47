// src/services/zapi.rs
//
// Cliente da Z-API. Uma chamada = um GET com o Client-Token da conta e
// timeout fixo por endpoint. Toda falha vira um `ZapiResponse` com
// `{error: true, message: ...}` — esse cliente NUNCA retorna Err, para o
// agregador poder tratar qualquer chamada do mesmo jeito.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::models::instancia::Instancia;

const BASE_URL_PADRAO: &str = "https://api.z-api.io";

// status/statistics são chamados em lote pelo painel, então o timeout é
// mais curto que o dos endpoints avulsos.
const TIMEOUT_STATUS: Duration = Duration::from_secs(8);
const TIMEOUT_INFO: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ZapiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ZapiClient {
    pub fn new() -> Self {
        Self::com_base_url(BASE_URL_PADRAO)
    }

    // Base alternativa para apontar os testes num servidor local.
    pub fn com_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    // GET /instances/{id}/token/{token}/status
    pub async fn status(&self, instancia: &Instancia, token_conta: &str) -> ZapiResponse {
        let url = self.url_instancia(instancia, "status");
        self.request(&url, token_conta, TIMEOUT_STATUS).await
    }

    // GET /instances/{id}/token/{token}/statistics
    pub async fn statistics(&self, instancia: &Instancia, token_conta: &str) -> ZapiResponse {
        let url = self.url_instancia(instancia, "statistics");
        self.request(&url, token_conta, TIMEOUT_STATUS).await
    }

    // GET /instances/{id}/token/{token}/me
    pub async fn info(&self, instancia: &Instancia, token_conta: &str) -> ZapiResponse {
        let url = self.url_instancia(instancia, "me");
        self.request(&url, token_conta, TIMEOUT_INFO).await
    }

    // GET /instances/{id}/token/{token}/phone-code/{telefone}
    pub async fn gerar_codigo(
        &self,
        instancia: &Instancia,
        telefone: &str,
        token_conta: &str,
    ) -> ZapiResponse {
        let url = self.url_instancia(instancia, &format!("phone-code/{telefone}"));
        self.request(&url, token_conta, TIMEOUT_INFO).await
    }

    fn url_instancia(&self, instancia: &Instancia, endpoint: &str) -> String {
        format!(
            "{}/instances/{}/token/{}/{}",
            self.base_url, instancia.id, instancia.token, endpoint
        )
    }

    pub(crate) async fn request(
        &self,
        url: &str,
        token_conta: &str,
        timeout: Duration,
    ) -> ZapiResponse {
        let resultado = self
            .http
            .get(url)
            .header("Client-Token", token_conta)
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .send()
            .await;

        let resposta = match resultado {
            Ok(resposta) => resposta,
            Err(e) if e.is_timeout() => return ZapiResponse::erro("Request timeout"),
            Err(e) => return ZapiResponse::erro(e.to_string()),
        };

        // Só 200 conta como sucesso; o resto vira o mesmo formato de erro
        // que o axios montava no painel antigo.
        if resposta.status() != StatusCode::OK {
            let status = resposta.status();
            return ZapiResponse::erro(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ));
        }

        match resposta.json::<Value>().await {
            Ok(corpo) => ZapiResponse(corpo),
            Err(e) => ZapiResponse::erro(e.to_string()),
        }
    }
}

impl Default for ZapiClient {
    fn default() -> Self {
        Self::new()
    }
}

// O payload da Z-API como veio, com acessores para os campos que o painel
// usa. A API às vezes devolve `error` como string ("You are not connected.")
// e o nosso caminho de falha devolve `error: true` + `message`; os dois
// casos passam por aqui.
#[derive(Debug, Clone)]
pub struct ZapiResponse(pub Value);

impl ZapiResponse {
    pub fn erro(mensagem: impl Into<String>) -> Self {
        Self(json!({ "error": true, "message": mensagem.into() }))
    }

    // `error` presente e "truthy" (true ou string não vazia).
    pub fn tem_erro(&self) -> bool {
        match self.0.get("error") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }

    // A forma string do `error`, usada para reconhecer os sinais esperados
    // de estado de conexão.
    pub fn erro_texto(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn mensagem(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }

    pub fn connected(&self) -> bool {
        self.0.get("connected").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn connected_explicito(&self) -> Option<bool> {
        self.0.get("connected").and_then(Value::as_bool)
    }

    pub fn qr_code(&self) -> Option<String> {
        self.campo_texto("qrCode")
    }

    pub fn phone_number(&self) -> Option<String> {
        self.campo_texto("phoneNumber")
    }

    pub fn name(&self) -> Option<String> {
        self.campo_texto("name")
    }

    pub fn last_activity(&self) -> Option<String> {
        self.campo_texto("lastActivity")
    }

    pub fn battery_level(&self) -> Option<i64> {
        self.0.get("batteryLevel").and_then(Value::as_i64)
    }

    pub fn messages(&self) -> i64 {
        self.0.get("messages").and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn contacts(&self) -> i64 {
        self.0.get("contacts").and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn code(&self) -> Option<String> {
        self.campo_texto("code")
    }

    fn campo_texto(&self, campo: &str) -> Option<String> {
        self.0
            .get(campo)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};

    async fn servidor(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endereco = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{endereco}")
    }

    fn instancia_teste() -> Instancia {
        Instancia {
            id: "ABC123".into(),
            token: "TOK456".into(),
            name: None,
        }
    }

    #[tokio::test]
    async fn sucesso_devolve_o_payload_intacto() {
        let app = Router::new().route(
            "/instances/{id}/token/{token}/status",
            get(|| async { axum::Json(json!({ "connected": true, "messages": 42 })) }),
        );
        let base = servidor(app).await;

        let cliente = ZapiClient::com_base_url(base);
        let resposta = cliente.status(&instancia_teste(), "conta").await;

        assert!(!resposta.tem_erro());
        assert!(resposta.connected());
        assert_eq!(resposta.messages(), 42);
    }

    #[tokio::test]
    async fn http_nao_200_vira_erro_com_codigo() {
        let app = Router::new().route(
            "/instances/{id}/token/{token}/status",
            get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = servidor(app).await;

        let cliente = ZapiClient::com_base_url(base);
        let resposta = cliente.status(&instancia_teste(), "conta").await;

        assert!(resposta.tem_erro());
        assert_eq!(resposta.mensagem(), Some("HTTP 500: Internal Server Error"));
    }

    #[tokio::test]
    async fn timeout_vira_request_timeout() {
        let app = Router::new().route(
            "/lento",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "tarde demais"
            }),
        );
        let base = servidor(app).await;

        let cliente = ZapiClient::com_base_url(base.clone());
        let resposta = cliente
            .request(&format!("{base}/lento"), "conta", Duration::from_millis(100))
            .await;

        assert!(resposta.tem_erro());
        assert_eq!(resposta.mensagem(), Some("Request timeout"));
    }

    #[tokio::test]
    async fn falha_de_transporte_vira_erro_com_a_mensagem() {
        // Porta fechada: erro de conexão, não de timeout.
        let cliente = ZapiClient::com_base_url("http://127.0.0.1:1");
        let resposta = cliente.status(&instancia_teste(), "conta").await;

        assert!(resposta.tem_erro());
        assert!(resposta.mensagem().is_some());
    }

    #[test]
    fn erro_em_forma_de_string_tambem_conta() {
        let resposta = ZapiResponse(json!({ "error": "You are not connected." }));
        assert!(resposta.tem_erro());
        assert_eq!(resposta.erro_texto(), Some("You are not connected."));

        let sem_erro = ZapiResponse(json!({ "connected": true }));
        assert!(!sem_erro.tem_erro());
    }
}

use std::time::Duration;

use reqwest::Client;

use super::error::AnthropicError;
use super::types::{MessagesRequest, MessagesResponse};

const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Qualquer coisa que possa responder a uma requisição Messages. Os estágios
/// dependem deste trait para os testes roteirizarem respostas sem rede.
pub trait MessageSender {
    async fn send_message(
        &self,
        req: &MessagesRequest,
    ) -> Result<MessagesResponse, AnthropicError>;
}

pub struct AnthropicClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Result<Self, AnthropicError> {
        Self::with_base_url(api_key, API_URL.to_string())
    }

    /// Cria um cliente apontando para uma base URL customizada (útil em
    /// testes).
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, AnthropicError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AnthropicError::Connection(e.to_string()))?;
        Ok(Self {
            api_key,
            client,
            base_url,
        })
    }
}

impl MessageSender for AnthropicClient {
    async fn send_message(
        &self,
        req: &MessagesRequest,
    ) -> Result<MessagesResponse, AnthropicError> {
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(req)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return Err(AnthropicError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AnthropicError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| AnthropicError::Parse(e.to_string()))?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anthropic::types::Message;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> MessagesRequest {
        MessagesRequest {
            model: "claude-haiku-4-5-20251001".into(),
            max_tokens: 512,
            system: Some("classify".into()),
            messages: vec![Message {
                role: "user".into(),
                content: "The app crashes on submit".into(),
            }],
        }
    }

    #[tokio::test]
    async fn successful_call_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{
                    "id": "msg_1",
                    "content": [{"type": "text", "text": "ok"}],
                    "model": "claude-haiku-4-5-20251001",
                    "stop_reason": "end_turn",
                    "usage": {"input_tokens": 3, "output_tokens": 1}
                }"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let client = AnthropicClient::with_base_url("key".into(), server.uri()).unwrap();
        let resp = client.send_message(&request()).await.unwrap();
        assert_eq!(resp.first_text(), "ok");
    }

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limited_with_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;

        let client = AnthropicClient::with_base_url("key".into(), server.uri()).unwrap();
        let err = client.send_message(&request()).await.unwrap_err();
        match err {
            AnthropicError::RateLimited { retry_after_ms } => assert_eq!(retry_after_ms, 3000),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let client = AnthropicClient::with_base_url("key".into(), server.uri()).unwrap();
        let err = client.send_message(&request()).await.unwrap_err();
        match err {
            AnthropicError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "overloaded");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_maps_to_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = AnthropicClient::with_base_url("key".into(), server.uri()).unwrap();
        let err = client.send_message(&request()).await.unwrap_err();
        assert!(matches!(err, AnthropicError::Parse(_)));
    }

    #[tokio::test]
    async fn connection_failure_maps_to_connection_error() {
        // A porta 1 essencialmente garante conexão recusada.
        let client =
            AnthropicClient::with_base_url("key".into(), "http://127.0.0.1:1".into()).unwrap();
        let err = client.send_message(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            AnthropicError::Connection(_) | AnthropicError::Timeout
        ));
    }
}

//! Tipos de requisição/resposta da API Messages da Anthropic.

use serde::{Deserialize, Serialize};

/// Corpo para o endpoint `/v1/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    /// Prompt de sistema opcional. Omitido do corpo JSON quando ausente.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<Message>,
}

/// Uma única mensagem em uma conversa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// "user" ou "assistant".
    pub role: String,
    pub content: String,
}

/// Resposta do endpoint `/v1/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    pub content: Vec<ContentBlock>,
    pub model: String,
    /// "end_turn", "max_tokens" etc.; `None` enquanto ainda em progresso.
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

impl MessagesResponse {
    /// Texto do primeiro bloco de conteúdo, sem espaços nas pontas. Vazio se
    /// a resposta não tem blocos.
    pub fn first_text(&self) -> String {
        self.content
            .first()
            .map(|b| b.text.trim().to_string())
            .unwrap_or_default()
    }
}

/// Um bloco de conteúdo, atualmente sempre texto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Serializado como "type" conforme o formato da API.
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// Contabilidade de tokens de uma chamada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

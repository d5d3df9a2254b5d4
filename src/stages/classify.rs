//! Estágio de classificação: uma chamada de modelo por tentativa,
//! retentativa limitada com escalação ao operador entre tentativas.

use crate::anthropic::{AnthropicError, Message, MessageSender, MessagesRequest};
use crate::error::{LensError, Result};
use crate::model::{Classification, FeedbackItem};
use crate::operator::{ExhaustedChoice, OperatorPrompt, RetryChoice};
use crate::prompts::CLASSIFIER_SYSTEM_PROMPT;

/// Resultado de rodar o estágio para um item.
#[derive(Debug, Clone)]
pub enum ClassifyOutcome {
    Classified(Classification),
    /// O operador escolheu pular; o item ignora todos os estágios restantes.
    Skipped,
}

pub struct ClassifyStage {
    model: String,
    max_attempts: u32,
}

impl ClassifyStage {
    pub fn new(model: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            model: model.into(),
            max_attempts,
        }
    }

    /// Conduz a chamada de classificação até uma classificação, um skip ou
    /// um aborto do operador.
    ///
    /// Falhas transientes (rate limit, timeout, conexão, erro de API)
    /// oferecem retry/skip/abort até o limite de tentativas e então forçam
    /// skip/abort. Falhas inesperadas oferecem uma única retentativa antes
    /// da mesma escolha forçada.
    pub async fn run(
        &self,
        client: &impl MessageSender,
        operator: &mut dyn OperatorPrompt,
        item: &FeedbackItem,
    ) -> Result<ClassifyOutcome> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let err = match self.call(client, item).await {
                Ok(classification) => return Ok(ClassifyOutcome::Classified(classification)),
                Err(err) => err,
            };

            if err.is_transient() {
                eprintln!(
                    "  Classification failed (attempt {attempt}/{}): {err} [item {}]",
                    self.max_attempts, item.id
                );
                if attempt >= self.max_attempts {
                    return match operator.on_retries_exhausted("classification", &err.to_string())?
                    {
                        ExhaustedChoice::Skip => Ok(ClassifyOutcome::Skipped),
                        ExhaustedChoice::Abort => Err(LensError::Aborted(
                            "classification retries exhausted".into(),
                        )),
                    };
                }
                match operator.on_call_failure(
                    "classification",
                    &err.to_string(),
                    attempt,
                    self.max_attempts,
                )? {
                    RetryChoice::Retry => continue,
                    RetryChoice::Skip => return Ok(ClassifyOutcome::Skipped),
                    RetryChoice::Abort => {
                        return Err(LensError::Aborted("classification failure".into()));
                    }
                }
            } else {
                // Erro inesperado: uma retentativa oferecida, nunca
                // automática.
                eprintln!("  Unexpected classification error: {err} [item {}]", item.id);
                match operator.on_call_failure(
                    "classification",
                    &err.to_string(),
                    attempt,
                    self.max_attempts,
                )? {
                    RetryChoice::Retry => {
                        if attempt >= self.max_attempts {
                            eprintln!("  Retry limit reached after unexpected error; skipping.");
                            return Ok(ClassifyOutcome::Skipped);
                        }
                        continue;
                    }
                    RetryChoice::Skip => return Ok(ClassifyOutcome::Skipped),
                    RetryChoice::Abort => {
                        return Err(LensError::Aborted("classification failure".into()));
                    }
                }
            }
        }
    }

    async fn call(
        &self,
        client: &impl MessageSender,
        item: &FeedbackItem,
    ) -> Result<Classification, AnthropicError> {
        let req = MessagesRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            system: Some(CLASSIFIER_SYSTEM_PROMPT.to_string()),
            messages: vec![Message {
                role: "user".into(),
                content: item.text.clone(),
            }],
        };
        let response = client.send_message(&req).await?;
        let text = response.first_text();
        serde_json::from_str(&text)
            .map_err(|e| AnthropicError::Parse(format!("classification output: {e}")))
    }
}

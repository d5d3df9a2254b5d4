//! Estágio de alinhamento: pontua um item classificado contra o documento
//! de estratégia normalizado.
//!
//! Pular o alinhamento não é pular o item: no skip do operador o estágio
//! fabrica uma avaliação neutra (score Low, sem itens relacionados) e o item
//! continua pelo pipeline.

use crate::anthropic::{AnthropicError, Message, MessageSender, MessagesRequest};
use crate::error::{LensError, Result};
use crate::model::{AlignmentAssessment, AlignmentScore, ClassificationState};
use crate::operator::{OperatorPrompt, RetryChoice};
use crate::prompts::ALIGNMENT_SYSTEM_PROMPT;
use crate::strategy::StrategyCache;

pub struct AlignStage {
    model: String,
    strategy: StrategyCache,
}

impl AlignStage {
    pub fn new(model: impl Into<String>, strategy: StrategyCache) -> Self {
        Self {
            model: model.into(),
            strategy,
        }
    }

    /// Avalia o alinhamento estratégico de um item classificado.
    ///
    /// Falha de forma dura quando nenhum documento de estratégia pode ser
    /// carregado; o workflow ao redor decide de antemão se o alinhamento
    /// está habilitado, então chegar a este estágio sem estratégia é erro de
    /// configuração, nunca um default silencioso.
    pub async fn run(
        &mut self,
        client: &impl MessageSender,
        operator: &mut dyn OperatorPrompt,
        state: &ClassificationState,
    ) -> Result<AlignmentAssessment> {
        let context = {
            let strategy = self.strategy.load()?;
            format!("{}\n{}", strategy.as_context(), feedback_context(state))
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let err = match self.call(client, &context).await {
                Ok(assessment) => return Ok(assessment),
                Err(err) => err,
            };

            eprintln!(
                "  Alignment assessment failed: {err} [item {}]",
                state.feedback.id
            );
            match operator.on_call_failure("alignment", &err.to_string(), attempt, 0)? {
                RetryChoice::Retry => continue,
                RetryChoice::Skip => {
                    // Skip do estágio, não do item: resultado neutro e o
                    // item continua.
                    return Ok(AlignmentAssessment {
                        alignment_score: AlignmentScore::Low,
                        related_strategy_items: Vec::new(),
                        reasoning: "Alignment assessment skipped due to error".into(),
                    });
                }
                RetryChoice::Abort => {
                    return Err(LensError::Aborted("alignment failure".into()));
                }
            }
        }
    }

    async fn call(
        &self,
        client: &impl MessageSender,
        context: &str,
    ) -> Result<AlignmentAssessment, AnthropicError> {
        let req = MessagesRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            system: Some(ALIGNMENT_SYSTEM_PROMPT.to_string()),
            messages: vec![Message {
                role: "user".into(),
                content: context.to_string(),
            }],
        };
        let response = client.send_message(&req).await?;
        let text = response.first_text();
        serde_json::from_str(&text)
            .map_err(|e| AnthropicError::Parse(format!("alignment output: {e}")))
    }
}

fn feedback_context(state: &ClassificationState) -> String {
    let category = state
        .suggested_category
        .map_or_else(|| "unknown".to_string(), |c| c.to_string());
    let priority = state
        .suggested_priority
        .map_or_else(|| "unknown".to_string(), |p| p.to_string());
    format!(
        "## Classified Feedback\n\nCategory: {}\nImpact Priority: {}\nClassification Reasoning: {}\n\n## Original Feedback Text\n\n{}",
        category,
        priority,
        state.reasoning.as_deref().unwrap_or(""),
        state.feedback.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anthropic::MessagesResponse;
    use crate::anthropic::types::{ContentBlock, Usage};
    use crate::model::{Category, FeedbackItem, Priority};
    use crate::operator::testing::ScriptedOperator;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    struct MockClient {
        responses: RefCell<Vec<Result<String, ()>>>,
    }

    impl MockClient {
        fn ok(text: &str) -> Self {
            Self {
                responses: RefCell::new(vec![Ok(text.to_string())]),
            }
        }

        fn failing(times: usize, then: &str) -> Self {
            let mut responses: Vec<Result<String, ()>> = vec![Err(()); times];
            responses.push(Ok(then.to_string()));
            Self {
                responses: RefCell::new(responses),
            }
        }
    }

    impl MessageSender for MockClient {
        async fn send_message(
            &self,
            _req: &MessagesRequest,
        ) -> Result<MessagesResponse, AnthropicError> {
            match self.responses.borrow_mut().remove(0) {
                Ok(text) => Ok(MessagesResponse {
                    id: "mock".into(),
                    content: vec![ContentBlock {
                        content_type: "text".into(),
                        text,
                    }],
                    model: "mock".into(),
                    stop_reason: Some("end_turn".into()),
                    usage: Usage {
                        input_tokens: 0,
                        output_tokens: 0,
                    },
                }),
                Err(()) => Err(AnthropicError::Timeout),
            }
        }
    }

    fn classified_state() -> ClassificationState {
        let mut state = ClassificationState::new(FeedbackItem {
            id: "t2".into(),
            text: "We need better analytics dashboards".into(),
            source: "interview".into(),
            timestamp: "2025-01-01T00:00:00Z".into(),
        });
        state.suggested_category = Some(Category::NewFeatureRequest);
        state.suggested_priority = Some(Priority::Medium);
        state.reasoning = Some("explicit dashboard ask".into());
        state
    }

    fn strategy_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("strategy_normalized.json"),
            r#"{
                "vision": "Leading analytics platform",
                "time_horizon": "2025",
                "items": [
                    {"id": "S1", "type": "objective", "title": "Best-in-class dashboards", "description": "Best-in-class dashboards", "importance": "critical"}
                ]
            }"#,
        )
        .unwrap();
        dir
    }

    fn stage(dir: &TempDir) -> AlignStage {
        AlignStage::new(
            "mock",
            StrategyCache::new(dir.path().join("strategy_normalized.json")),
        )
    }

    const GOOD: &str = r#"{"alignment_score":"High","related_strategy_items":["S1"],"reasoning":"supports the dashboard objective"}"#;

    #[tokio::test]
    async fn successful_assessment() {
        let dir = strategy_dir();
        let mut stage = stage(&dir);
        let client = MockClient::ok(GOOD);
        let mut operator = ScriptedOperator::default();

        let a = stage
            .run(&client, &mut operator, &classified_state())
            .await
            .unwrap();
        assert_eq!(a.alignment_score, AlignmentScore::High);
        assert_eq!(a.related_strategy_items, vec!["S1".to_string()]);
    }

    #[tokio::test]
    async fn missing_strategy_is_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut stage = AlignStage::new("mock", StrategyCache::new(dir.path().join("absent.json")));
        let client = MockClient::ok(GOOD);
        let mut operator = ScriptedOperator::default();

        let err = stage
            .run(&client, &mut operator, &classified_state())
            .await
            .unwrap_err();
        assert!(matches!(err, LensError::StrategyMissing(_)));
    }

    #[tokio::test]
    async fn retry_then_success() {
        let dir = strategy_dir();
        let mut stage = stage(&dir);
        let client = MockClient::failing(2, GOOD);
        let mut operator = ScriptedOperator::always_retry();

        let a = stage
            .run(&client, &mut operator, &classified_state())
            .await
            .unwrap();
        assert_eq!(a.alignment_score, AlignmentScore::High);
        assert_eq!(operator.failures_seen.len(), 2);
    }

    #[tokio::test]
    async fn stage_skip_fabricates_neutral_outcome() {
        let dir = strategy_dir();
        let mut stage = stage(&dir);
        let client = MockClient::failing(5, GOOD);
        let mut operator = ScriptedOperator {
            retry_choices: vec![RetryChoice::Skip],
            ..Default::default()
        };

        let a = stage
            .run(&client, &mut operator, &classified_state())
            .await
            .unwrap();
        assert_eq!(a.alignment_score, AlignmentScore::Low);
        assert!(a.related_strategy_items.is_empty());
        assert_eq!(a.reasoning, "Alignment assessment skipped due to error");
    }

    #[tokio::test]
    async fn abort_raises() {
        let dir = strategy_dir();
        let mut stage = stage(&dir);
        let client = MockClient::failing(5, GOOD);
        let mut operator = ScriptedOperator {
            retry_choices: vec![RetryChoice::Abort],
            ..Default::default()
        };

        let err = stage
            .run(&client, &mut operator, &classified_state())
            .await
            .unwrap_err();
        assert!(err.is_abort());
    }
}

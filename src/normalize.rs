//! Normalização one-shot do documento de estratégia para a forma estruturada
//! que o estágio de alinhamento consome.

use std::collections::BTreeMap;
use std::path::Path;

use crate::anthropic::{AnthropicError, Message, MessageSender, MessagesRequest};
use crate::error::{LensError, Result};
use crate::prompts::NORMALIZATION_SYSTEM_PROMPT;
use crate::strategy::{Importance, NormalizedStrategy};
use crate::ui::Spinner;

pub async fn run_normalize(
    client: &impl MessageSender,
    model: &str,
    strategy_path: &Path,
    output_path: &Path,
) -> Result<NormalizedStrategy> {
    let content = std::fs::read_to_string(strategy_path).map_err(|_| {
        LensError::InputValidation(format!(
            "strategy file not found: {}. Create it, or run with --no-alignment",
            strategy_path.display()
        ))
    })?;
    if content.trim().is_empty() {
        return Err(LensError::InputValidation(format!(
            "strategy file is empty: {}. Add content, or run with --no-alignment",
            strategy_path.display()
        )));
    }

    println!("Normalizing strategy from {}...", strategy_path.display());
    println!("  Strategy length: {} characters", content.len());

    let spinner = Spinner::start("Normalizing strategy");
    let result = match call(client, model, &content).await {
        Ok(r) => r,
        Err(e) => {
            spinner.fail("Normalization failed");
            return Err(e.into());
        }
    };

    // Uma estratégia sem itens extraíveis não pode guiar o alinhamento.
    if result.items.is_empty() {
        spinner.fail("No strategic items extracted");
        return Err(LensError::InputValidation(format!(
            "no strategic items extracted from {}. Make the document more concrete, or run with --no-alignment",
            strategy_path.display()
        )));
    }

    std::fs::write(output_path, serde_json::to_string_pretty(&result)?)?;

    spinner.succeed(&format!("Extracted {} strategic items:", result.items.len()));
    let critical = result
        .items
        .iter()
        .filter(|i| i.importance == Importance::Critical)
        .count();
    let high = result
        .items
        .iter()
        .filter(|i| i.importance == Importance::High)
        .count();
    let medium = result
        .items
        .iter()
        .filter(|i| i.importance == Importance::Medium)
        .count();
    println!("  {critical} critical, {high} high, {medium} medium");

    let mut type_counts: BTreeMap<String, usize> = BTreeMap::new();
    for item in &result.items {
        *type_counts.entry(item.item_type.to_string()).or_default() += 1;
    }
    println!();
    println!("Breakdown by type:");
    for (item_type, count) in &type_counts {
        println!("  {count} {item_type}");
    }

    println!();
    println!("Vision: {}", result.vision);
    println!("Time horizon: {}", result.time_horizon);
    println!();
    println!("Saved to: {}", output_path.display());
    println!("Review the normalized strategy before running classification.");

    Ok(result)
}

async fn call(
    client: &impl MessageSender,
    model: &str,
    content: &str,
) -> Result<NormalizedStrategy, AnthropicError> {
    let req = MessagesRequest {
        model: model.to_string(),
        max_tokens: 8192,
        system: Some(NORMALIZATION_SYSTEM_PROMPT.to_string()),
        messages: vec![Message {
            role: "user".into(),
            content: format!("Normalize this strategy document:\n\n{content}"),
        }],
    };
    let response = client.send_message(&req).await?;
    let text = response.first_text();
    serde_json::from_str(&text)
        .map_err(|e| AnthropicError::Parse(format!("normalization output: {e}")))
}

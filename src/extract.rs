//! Extração one-shot de itens de feedback a partir de uma transcrição bruta.
//!
//! Produz um arquivo JSON no mesmo formato que `run` ingere, com dois campos
//! extras (`source_quote`, `extracted_type`) mantidos como dicas para quem
//! revisa a extração antes da classificação.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::anthropic::{AnthropicError, Message, MessageSender, MessagesRequest};
use crate::error::{LensError, Result};
use crate::prompts::EXTRACTION_SYSTEM_PROMPT;
use crate::ui::Spinner;

/// Um item como o modelo o reporta.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedItem {
    pub text: String,
    pub source_quote: String,
    pub item_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionResult {
    pub items: Vec<ExtractedItem>,
}

/// Um item como escrito no arquivo de saída. Superconjunto do registro de
/// entrada de `run`, então o arquivo alimenta a classificação diretamente.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedFeedback {
    pub id: String,
    pub text: String,
    pub source: String,
    pub timestamp: String,
    pub source_quote: String,
    pub extracted_type: String,
}

pub async fn run_extract(
    client: &impl MessageSender,
    model: &str,
    transcript: &Path,
    output: Option<PathBuf>,
    source: &str,
) -> Result<Vec<ExtractedFeedback>> {
    let text = std::fs::read_to_string(transcript).map_err(|e| {
        LensError::InputValidation(format!("cannot read transcript {}: {e}", transcript.display()))
    })?;
    let output = output.unwrap_or_else(|| PathBuf::from("extracted_items.json"));

    println!("Extracting feedback from {}...", transcript.display());
    println!("  Transcript length: {} characters", text.len());

    let spinner = Spinner::start("Extracting feedback items");
    let result = call(client, model, &text).await;
    let result = match result {
        Ok(r) => r,
        Err(e) => {
            spinner.fail("Extraction failed");
            return Err(e.into());
        }
    };

    let stem = transcript
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "transcript".to_string());
    let timestamp = Utc::now().to_rfc3339();

    let items: Vec<ExtractedFeedback> = result
        .items
        .into_iter()
        .enumerate()
        .map(|(i, item)| ExtractedFeedback {
            id: format!("{stem}_{:03}", i + 1),
            text: item.text,
            source: source.to_string(),
            timestamp: timestamp.clone(),
            source_quote: item.source_quote,
            extracted_type: item.item_type,
        })
        .collect();

    std::fs::write(&output, serde_json::to_string_pretty(&items)?)?;

    spinner.succeed(&format!("Extracted {} items:", items.len()));
    for item in &items {
        let preview: String = item.text.chars().take(80).collect();
        println!("  [{}] {preview}...", item.extracted_type);
    }
    println!();
    println!("  Saved to: {}", output.display());
    println!("  Next step: review the extracted items, then run: prioritylens run {}", output.display());

    Ok(items)
}

async fn call(
    client: &impl MessageSender,
    model: &str,
    transcript: &str,
) -> Result<ExtractionResult, AnthropicError> {
    let req = MessagesRequest {
        model: model.to_string(),
        max_tokens: 8192,
        system: Some(EXTRACTION_SYSTEM_PROMPT.to_string()),
        messages: vec![Message {
            role: "user".into(),
            content: format!("Extract feedback items from this transcript:\n\n{transcript}"),
        }],
    };
    let response = client.send_message(&req).await?;
    let text = response.first_text();
    serde_json::from_str(&text).map_err(|e| AnthropicError::Parse(format!("extraction output: {e}")))
}

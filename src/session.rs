//! Sessão interativa de execução: validação de entrada, fila retomável e o
//! acionamento item a item do motor de workflow.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::anthropic::MessageSender;
use crate::config::LensConfig;
use crate::decisions::DecisionLog;
use crate::error::{LensError, Result};
use crate::model::FeedbackItem;
use crate::normalize;
use crate::operator::OperatorPrompt;
use crate::persist::PersistCascade;
use crate::progress::{FilterMode, ItemState, ProgressMap};
use crate::review::ReviewCollector;
use crate::stages::{AlignStage, ClassifyStage};
use crate::strategy::StrategyCache;
use crate::ui;
use crate::workflow::{ResumeOutcome, StartOutcome, SuspensionStore, WorkflowEngine};

pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub decisions: PathBuf,
    pub no_alignment: bool,
    pub review_skipped: bool,
    pub strategy: Option<PathBuf>,
}

/// Roda a sessão interativa de classificação sobre um arquivo de entrada.
///
/// O progresso é persistido a cada item, então abortar (ou cair) no meio
/// perde no máximo o item em voo; a próxima invocação retoma de onde esta
/// parou.
pub async fn run<C: MessageSender>(
    client: C,
    config: &LensConfig,
    operator: &mut dyn OperatorPrompt,
    reviewer: &mut dyn ReviewCollector,
    opts: RunOptions,
) -> Result<()> {
    let items = load_input(&opts.input)?;
    let align = ensure_strategy_ready(&client, config, &opts).await?;

    let checkpoint = sibling(&opts.output, "progress.json");
    let suspended = sibling(&opts.output, "suspended.json");
    let log = ui::SessionLog::new(sibling(&opts.output, "classifier.log"));

    let mut progress = ProgressMap::load(&checkpoint, &opts.output);
    let mode = if opts.review_skipped {
        FilterMode::SkippedOnly
    } else {
        FilterMode::Pending
    };
    let total_input = items.len();
    let queue = progress.filter(items, mode);

    ui::session_start(total_input, queue.len(), align.is_some());
    if queue.is_empty() {
        println!("Nothing to do.");
        return Ok(());
    }
    log.session_started();

    let mut engine = WorkflowEngine::new(
        client,
        ClassifyStage::new(&config.classification_model, config.max_retries),
        align,
        SuspensionStore::load(&suspended),
        PersistCascade::new(&opts.output),
        DecisionLog::new(&opts.decisions),
    );

    let total = queue.len();
    let mut processed = 0usize;
    let mut skipped = 0usize;

    for (i, item) in queue.into_iter().enumerate() {
        let id = item.id.clone();
        ui::item_header(i + 1, total, &id);

        // Uma execução interrompida pode deixar o item já suspenso; reentrega
        // o payload armazenado em vez de rodar os estágios de novo.
        let payload = match engine.pending_suspension(&id) {
            Some(payload) => payload,
            None => match engine.start(operator, item).await? {
                StartOutcome::Suspended(payload) => payload,
                StartOutcome::Skipped => {
                    ui::item_skipped(&id);
                    log.line(&format!("Skipped: {id}"));
                    skipped += 1;
                    progress.mark(&id, ItemState::Skipped);
                    progress.save(&checkpoint)?;
                    continue;
                }
            },
        };

        let decision = reviewer.collect(&payload, i + 1, total)?;
        match engine.resume(operator, &id, decision)? {
            ResumeOutcome::Saved(status) => {
                ui::item_saved(&status);
                log.line(&format!("Saved: {id}"));
                processed += 1;
                progress.mark(&id, ItemState::Processed);
            }
            ResumeOutcome::Skipped => {
                ui::item_skipped(&id);
                log.line(&format!("Skipped at review: {id}"));
                skipped += 1;
                progress.mark(&id, ItemState::Skipped);
            }
        }
        progress.save(&checkpoint)?;
    }

    ui::session_summary(processed, skipped);
    log.session_ended();
    Ok(())
}

/// Carrega e valida o arquivo de entrada. A validação é tudo-ou-nada: um
/// único registro ruim falha a execução antes de qualquer item ser
/// processado.
pub fn load_input(path: &Path) -> Result<Vec<FeedbackItem>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        LensError::InputValidation(format!("cannot read input {}: {e}", path.display()))
    })?;
    let items: Vec<FeedbackItem> = serde_json::from_str(&contents).map_err(|e| {
        LensError::InputValidation(format!("input {} is not valid JSON: {e}", path.display()))
    })?;

    if items.is_empty() {
        return Err(LensError::InputValidation(format!(
            "input {} contains no items",
            path.display()
        )));
    }

    let mut seen = BTreeSet::new();
    for (i, item) in items.iter().enumerate() {
        if item.id.trim().is_empty() {
            return Err(LensError::InputValidation(format!(
                "record {} has an empty id",
                i + 1
            )));
        }
        if item.text.trim().is_empty() {
            return Err(LensError::InputValidation(format!(
                "record {} ({}) has empty text",
                i + 1,
                item.id
            )));
        }
        if !seen.insert(item.id.as_str()) {
            return Err(LensError::InputValidation(format!(
                "duplicate id {} at record {}",
                item.id,
                i + 1
            )));
        }
    }
    Ok(items)
}

/// Decide se esta execução alinha, e contra qual arquivo de estratégia.
///
/// Um --strategy passado explicitamente precisa carregar ou a execução
/// falha. Nos caminhos padrão a estratégia normalizada é reconstruída
/// automaticamente quando está ausente ou mais velha que o documento fonte,
/// e qualquer falha restante rebaixa a execução para classificação pura com
/// um aviso.
async fn ensure_strategy_ready<C: MessageSender>(
    client: &C,
    config: &LensConfig,
    opts: &RunOptions,
) -> Result<Option<AlignStage>> {
    if opts.no_alignment {
        println!("Strategic alignment disabled (--no-alignment).");
        return Ok(None);
    }

    if let Some(path) = &opts.strategy {
        // Arquivo normalizado explícito: sem auto-normalização, sem rebaixar.
        let mut cache = StrategyCache::new(path);
        cache.load()?;
        return Ok(Some(AlignStage::new(&config.alignment_model, cache)));
    }

    let source = PathBuf::from(&config.strategy_file);
    let normalized = PathBuf::from(&config.normalized_strategy_file);

    if needs_normalization(&source, &normalized) {
        match normalize::run_normalize(client, &config.normalization_model, &source, &normalized)
            .await
        {
            Ok(_) => {}
            Err(e) => {
                eprintln!("Warning: strategy normalization failed: {e}");
                eprintln!("Continuing without alignment (classification only).");
                return Ok(None);
            }
        }
    }

    let mut cache = StrategyCache::new(&normalized);
    match cache.load() {
        Ok(_) => Ok(Some(AlignStage::new(&config.alignment_model, cache))),
        Err(e) => {
            eprintln!("Warning: {e}");
            eprintln!("Continuing without alignment (classification only).");
            Ok(None)
        }
    }
}

/// A estratégia normalizada é reconstruída quando o documento fonte existe e
/// o arquivo normalizado está ausente ou mais velho que ele.
fn needs_normalization(source: &Path, normalized: &Path) -> bool {
    if !source.exists() {
        return false;
    }
    if !normalized.exists() {
        return true;
    }
    let mtime = |p: &Path| std::fs::metadata(p).and_then(|m| m.modified());
    match (mtime(source), mtime(normalized)) {
        (Ok(s), Ok(n)) => s > n,
        _ => false,
    }
}

/// Imprime contagens de progresso e suspensões pendentes de um arquivo de
/// saída.
pub fn status(output: &Path) {
    let checkpoint = sibling(output, "progress.json");
    let suspended = sibling(output, "suspended.json");

    let progress = ProgressMap::load(&checkpoint, output);
    let suspensions = SuspensionStore::load(&suspended);

    println!("Output: {}", output.display());
    println!("  processed: {}", progress.count(ItemState::Processed));
    println!("  skipped:   {}", progress.count(ItemState::Skipped));
    if suspensions.is_empty() {
        println!("  no pending reviews");
    } else {
        println!("  pending review: {}", suspensions.len());
    }
}

fn sibling(output: &Path, name: &str) -> PathBuf {
    output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(name)
}

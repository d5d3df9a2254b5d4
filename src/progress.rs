//! Rastreamento durável de progresso por item.
//!
//! O mapa de progresso é o registro de retomada: carregado uma vez no início
//! do processo, atualizado após cada resultado terminal e reescrito de forma
//! atômica, então um crash perde no máximo o item em voo.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::FeedbackItem;

/// Estado terminal de um item. Ausência no mapa significa pendente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Processed,
    Skipped,
}

/// Qual fatia da fila uma execução processa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Itens ainda não processados nem pulados.
    Pending,
    /// Apenas itens previamente pulados (modo `--review-skipped`).
    SkippedOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMap {
    #[serde(flatten)]
    entries: BTreeMap<String, ItemState>,
}

impl ProgressMap {
    /// Carrega o progresso, preferindo o arquivo de checkpoint. Checkpoint
    /// ausente ou imparseável cai para a reconstrução a partir do log de
    /// saída (cada id já salvo é assumido processado); falhando isso o mapa
    /// começa vazio. Load nunca derruba a execução.
    pub fn load(checkpoint: &Path, output_log: &Path) -> Self {
        if checkpoint.exists() {
            match fs::read_to_string(checkpoint)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
            {
                Ok(map) => return map,
                Err(e) => {
                    eprintln!(
                        "Warning: could not load {}: {e}; rebuilding progress from the output log",
                        checkpoint.display()
                    );
                }
            }
        }
        Self::from_output_log(output_log)
    }

    /// Reconstrói marcando cada id do log de saída como processado.
    fn from_output_log(output_log: &Path) -> Self {
        let mut map = ProgressMap::default();
        let file = match fs::File::open(output_log) {
            Ok(f) => f,
            Err(_) => return map, // sem saída anterior, começa do zero
        };

        #[derive(Deserialize)]
        struct IdOnly {
            id: String,
        }

        for line in BufReader::new(file).lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<IdOnly>(&line) {
                Ok(row) => {
                    map.entries.insert(row.id, ItemState::Processed);
                }
                Err(e) => {
                    eprintln!("Warning: skipping malformed output line while rebuilding progress: {e}");
                }
            }
        }
        map
    }

    /// Persiste o mapa atomicamente: escreve um arquivo temporário vizinho e
    /// o renomeia para o lugar, então um crash no meio da escrita não pode
    /// corromper o checkpoint.
    pub fn save(&self, checkpoint: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let tmp = checkpoint.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, checkpoint)?;
        Ok(())
    }

    pub fn mark(&mut self, id: impl Into<String>, state: ItemState) {
        self.entries.insert(id.into(), state);
    }

    pub fn get(&self, id: &str) -> Option<ItemState> {
        self.entries.get(id).copied()
    }

    pub fn count(&self, state: ItemState) -> usize {
        self.entries.values().filter(|&&s| s == state).count()
    }

    /// Particiona a fila candidata de acordo com o modo da execução.
    pub fn filter(&self, items: Vec<FeedbackItem>, mode: FilterMode) -> Vec<FeedbackItem> {
        items
            .into_iter()
            .filter(|item| match mode {
                FilterMode::Pending => self.get(&item.id).is_none(),
                FilterMode::SkippedOnly => self.get(&item.id) == Some(ItemState::Skipped),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn item(id: &str) -> FeedbackItem {
        FeedbackItem {
            id: id.into(),
            text: "text".into(),
            source: "test".into(),
            timestamp: "2025-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempdir().unwrap();
        let checkpoint = dir.path().join("progress.json");
        let output = dir.path().join("output.jsonl");

        let mut map = ProgressMap::default();
        map.mark("a", ItemState::Processed);
        map.mark("b", ItemState::Skipped);
        map.save(&checkpoint).unwrap();

        let loaded = ProgressMap::load(&checkpoint, &output);
        assert_eq!(loaded, map);

        // save(load()) é idempotente.
        loaded.save(&checkpoint).unwrap();
        assert_eq!(ProgressMap::load(&checkpoint, &output), map);
    }

    #[test]
    fn missing_checkpoint_rebuilds_from_output_log() {
        let dir = tempdir().unwrap();
        let checkpoint = dir.path().join("progress.json");
        let output = dir.path().join("output.jsonl");
        std::fs::write(
            &output,
            "{\"id\":\"x1\",\"category\":\"Bug\"}\n{\"id\":\"x2\",\"category\":\"Pain\"}\n",
        )
        .unwrap();

        let map = ProgressMap::load(&checkpoint, &output);
        assert_eq!(map.get("x1"), Some(ItemState::Processed));
        assert_eq!(map.get("x2"), Some(ItemState::Processed));
        assert_eq!(map.get("x3"), None);
    }

    #[test]
    fn corrupt_checkpoint_falls_back_to_output_log() {
        let dir = tempdir().unwrap();
        let checkpoint = dir.path().join("progress.json");
        let output = dir.path().join("output.jsonl");
        std::fs::write(&checkpoint, "{{{ not json").unwrap();
        std::fs::write(&output, "{\"id\":\"x1\"}\n").unwrap();

        let map = ProgressMap::load(&checkpoint, &output);
        assert_eq!(map.get("x1"), Some(ItemState::Processed));
    }

    #[test]
    fn nothing_on_disk_starts_empty() {
        let dir = tempdir().unwrap();
        let map = ProgressMap::load(
            &dir.path().join("progress.json"),
            &dir.path().join("output.jsonl"),
        );
        assert_eq!(map, ProgressMap::default());
    }

    #[test]
    fn checkpoint_format_is_flat_id_to_state() {
        let dir = tempdir().unwrap();
        let checkpoint = dir.path().join("progress.json");
        let mut map = ProgressMap::default();
        map.mark("feedback_1", ItemState::Processed);
        map.save(&checkpoint).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&checkpoint).unwrap()).unwrap();
        assert_eq!(raw["feedback_1"], "processed");
    }

    #[test]
    fn filter_pending_excludes_terminal_items() {
        let mut map = ProgressMap::default();
        map.mark("a", ItemState::Processed);
        map.mark("b", ItemState::Skipped);

        let items = vec![item("a"), item("b"), item("c"), item("d")];
        let pending = map.filter(items, FilterMode::Pending);
        let ids: Vec<&str> = pending.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[test]
    fn filter_skipped_only_returns_exactly_skipped() {
        let mut map = ProgressMap::default();
        map.mark("a", ItemState::Processed);
        map.mark("b", ItemState::Skipped);

        let items = vec![item("a"), item("b"), item("c")];
        let skipped = map.filter(items, FilterMode::SkippedOnly);
        let ids: Vec<&str> = skipped.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn counts_by_state() {
        let mut map = ProgressMap::default();
        map.mark("a", ItemState::Processed);
        map.mark("b", ItemState::Processed);
        map.mark("c", ItemState::Skipped);
        assert_eq!(map.count(ItemState::Processed), 2);
        assert_eq!(map.count(ItemState::Skipped), 1);
    }

    #[test]
    fn no_stale_temp_file_after_save() {
        let dir = tempdir().unwrap();
        let checkpoint = dir.path().join("progress.json");
        let mut map = ProgressMap::default();
        map.mark("a", ItemState::Processed);
        map.save(&checkpoint).unwrap();

        assert!(checkpoint.exists());
        assert!(!checkpoint.with_extension("tmp").exists());
    }
}

//! Armazenamento durável para itens suspensos no portão de revisão humana.
//!
//! Suspensões sobrevivem ao processo: uma execução pode classificar um item,
//! cair, e uma execução posterior ainda encontra o estado completo esperando
//! revisão. O armazenamento é um único mapa JSON reescrito atomicamente a
//! cada mudança.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LensError, Result};
use crate::model::ClassificationState;

pub struct SuspensionStore {
    path: PathBuf,
    entries: BTreeMap<String, ClassificationState>,
}

impl SuspensionStore {
    /// Carrega o armazenamento do disco. Arquivo ausente significa nenhuma
    /// suspensão; arquivo imparseável é reportado e tratado como vazio em
    /// vez de bloquear a execução.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = if path.exists() {
            match fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
            {
                Ok(entries) => entries,
                Err(e) => {
                    eprintln!(
                        "Warning: could not load suspensions from {}: {e}; starting empty",
                        path.display()
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Self { path, entries }
    }

    /// Registra uma suspensão, substituindo qualquer uma obsoleta do mesmo
    /// item.
    pub fn put(&mut self, state: ClassificationState) -> Result<()> {
        self.entries.insert(state.feedback.id.clone(), state);
        self.save()
    }

    /// Consome a suspensão de `id`. One-shot: um segundo take do mesmo id
    /// falha com `NoPendingSuspension`.
    pub fn take(&mut self, id: &str) -> Result<ClassificationState> {
        let state = self
            .entries
            .remove(id)
            .ok_or_else(|| LensError::NoPendingSuspension(id.to_string()))?;
        self.save()?;
        Ok(state)
    }

    pub fn get(&self, id: &str) -> Option<&ClassificationState> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

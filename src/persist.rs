//! Cascata de persistência para registros finalizados.
//!
//! Fallback ordenado: append no JSONL primário, depois um log de recuperação
//! compartilhado, depois um snapshot de emergência isolado, depois uma
//! escolha explícita do operador. A saída nunca é perdida em silêncio.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use console::Style;

use crate::error::{LensError, Result};
use crate::model::SavedRecord;
use crate::operator::{LossChoice, OperatorPrompt};

/// Qual nível aceitou o registro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    SavedToRecovery(PathBuf),
    SavedToEmergency(PathBuf),
    /// Todos os níveis falharam e o operador reconheceu a perda.
    SaveFailed,
}

pub struct PersistCascade {
    primary: PathBuf,
    recovery: PathBuf,
    emergency_dir: PathBuf,
}

impl PersistCascade {
    pub fn new(primary: impl Into<PathBuf>) -> Self {
        let primary: PathBuf = primary.into();
        let recovery = PathBuf::from(format!("{}.recovery.jsonl", primary.display()));
        let emergency_dir = primary
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            primary,
            recovery,
            emergency_dir,
        }
    }

    /// Sobrescreve os alvos de fallback (usado pelos testes para simular
    /// falhas de nível de forma independente).
    pub fn with_targets(
        primary: impl Into<PathBuf>,
        recovery: impl Into<PathBuf>,
        emergency_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            primary: primary.into(),
            recovery: recovery.into(),
            emergency_dir: emergency_dir.into(),
        }
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    /// Acrescenta um registro finalizado de forma durável, descendo pelos
    /// níveis de fallback. Apenas a escolha de abortar do operador levanta
    /// erro.
    pub fn append(
        &self,
        record: &SavedRecord,
        operator: &mut dyn OperatorPrompt,
    ) -> Result<SaveStatus> {
        let line = serde_json::to_string(record)?;
        let green = Style::new().green().bold();

        let primary_err = match append_line(&self.primary, &line) {
            Ok(()) => {
                println!(
                    "  {} Saved: {} → {} ({})",
                    green.apply_to("✓"),
                    record.feedback.id,
                    record.category,
                    record.priority
                );
                return Ok(SaveStatus::Saved);
            }
            Err(e) => e,
        };
        eprintln!("  Primary save failed: {primary_err}");

        let recovery_err = match append_line(&self.recovery, &line) {
            Ok(()) => {
                eprintln!(
                    "  {} Saved to recovery log: {}",
                    green.apply_to("✓"),
                    self.recovery.display()
                );
                return Ok(SaveStatus::SavedToRecovery(self.recovery.clone()));
            }
            Err(e) => e,
        };
        eprintln!("  Recovery save also failed: {recovery_err}");

        let emergency = self.emergency_dir.join(format!(
            "emergency_save_{}_{}.json",
            record.feedback.id,
            Utc::now().format("%Y%m%d_%H%M%S")
        ));
        let emergency_err = match serde_json::to_string_pretty(record)
            .map_err(LensError::from)
            .and_then(|pretty| std::fs::write(&emergency, pretty).map_err(LensError::from))
        {
            Ok(()) => {
                eprintln!(
                    "  {} Saved to emergency file: {}",
                    green.apply_to("✓"),
                    emergency.display()
                );
                eprintln!(
                    "  You MUST manually merge this file into {}",
                    self.primary.display()
                );
                return Ok(SaveStatus::SavedToEmergency(emergency));
            }
            Err(e) => e,
        };

        eprintln!("  All save attempts failed!");
        eprintln!("    Primary error: {primary_err}");
        eprintln!("    Recovery error: {recovery_err}");
        eprintln!("    Emergency error: {emergency_err}");

        let pretty = serde_json::to_string_pretty(record)?;
        match operator.on_save_exhausted(&pretty)? {
            LossChoice::Continue => {
                eprintln!("  WARNING: continuing without saving. Data loss occurred.");
                Ok(SaveStatus::SaveFailed)
            }
            LossChoice::Abort => Err(LensError::Aborted(
                "save failure; check file system permissions".into(),
            )),
        }
    }
}

fn append_line(path: &Path, line: &str) -> Result<(), std::io::Error> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

//! Prompts de escalação ao operador.
//!
//! Todo caminho de escalação do pipeline converge para as mesmas três
//! escolhas canônicas (retry / skip / abort), então a memória muscular do
//! operador transfere entre estágios. A cascata de persistência tem sua
//! própria escolha terminal (continuar-com-perda / abortar).

use console::Style;
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;

use crate::error::{LensError, Result};

/// Escolha oferecida enquanto ainda há retentativas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryChoice {
    Retry,
    Skip,
    Abort,
}

/// Escolha forçada após o limite de retentativas se esgotar. Não existe
/// caminho de falha silencioso: o operador precisa escolher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustedChoice {
    Skip,
    Abort,
}

/// Escolha terminal depois que todos os níveis de persistência falharam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossChoice {
    Continue,
    Abort,
}

/// Colaborador externo que media a escalação de falhas. Os estágios chamam
/// isto entre tentativas; a implementação CLI bloqueia na entrada do
/// terminal.
pub trait OperatorPrompt {
    /// Uma chamada de capacidade falhou e retentar ainda é possível.
    /// `max_attempts` igual a 0 significa que o estágio retenta sem limite.
    fn on_call_failure(
        &mut self,
        stage: &str,
        error: &str,
        attempt: u32,
        max_attempts: u32,
    ) -> Result<RetryChoice>;

    /// O limite de retentativas se esgotou; restam apenas skip e abort.
    fn on_retries_exhausted(&mut self, stage: &str, error: &str) -> Result<ExhaustedChoice>;

    /// Todos os níveis de persistência falharam para o registro dado.
    fn on_save_exhausted(&mut self, record_json: &str) -> Result<LossChoice>;
}

/// Implementação de terminal baseada em dialoguer.
pub struct CliOperator {
    red: Style,
    yellow: Style,
}

impl Default for CliOperator {
    fn default() -> Self {
        Self {
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }
}

impl CliOperator {
    fn select(&self, prompt: &str, items: &[&str]) -> Result<usize> {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .map_err(|e| match e {
                dialoguer::Error::IO(io) => LensError::Io(io),
            })
    }
}

impl OperatorPrompt for CliOperator {
    fn on_call_failure(
        &mut self,
        stage: &str,
        error: &str,
        attempt: u32,
        max_attempts: u32,
    ) -> Result<RetryChoice> {
        let counter = if max_attempts > 0 {
            format!("attempt {attempt}/{max_attempts}")
        } else {
            format!("attempt {attempt}")
        };
        eprintln!(
            "  {} {stage} failed ({counter}): {error}",
            self.yellow.apply_to("↻")
        );
        match self.select("How do you want to proceed?", &["Retry", "Skip", "Abort"])? {
            0 => Ok(RetryChoice::Retry),
            1 => Ok(RetryChoice::Skip),
            _ => Ok(RetryChoice::Abort),
        }
    }

    fn on_retries_exhausted(&mut self, stage: &str, error: &str) -> Result<ExhaustedChoice> {
        eprintln!(
            "  {} {stage} failed and the retry limit is reached: {error}",
            self.red.apply_to("✗")
        );
        match self.select("How do you want to proceed?", &["Skip", "Abort"])? {
            0 => Ok(ExhaustedChoice::Skip),
            _ => Ok(ExhaustedChoice::Abort),
        }
    }

    fn on_save_exhausted(&mut self, record_json: &str) -> Result<LossChoice> {
        eprintln!("  {} All save attempts failed!", self.red.apply_to("CRITICAL:"));
        eprintln!("  Data to recover manually:\n{record_json}");
        match self.select(
            "Continue WITHOUT saving (data will be lost), or abort?",
            &["Continue (data will be lost)", "Abort"],
        )? {
            0 => Ok(LossChoice::Continue),
            _ => Ok(LossChoice::Abort),
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! Operador roteirizado usado pelos testes de estágio e do engine.

    use super::*;

    /// Reproduz uma sequência fixa de escolhas e registra cada escalação que
    /// o pipeline apresentou.
    #[derive(Default)]
    pub struct ScriptedOperator {
        pub retry_choices: Vec<RetryChoice>,
        pub exhausted_choices: Vec<ExhaustedChoice>,
        pub loss_choices: Vec<LossChoice>,
        pub failures_seen: Vec<(String, u32)>,
        pub exhausted_seen: Vec<String>,
        pub loss_seen: usize,
    }

    impl ScriptedOperator {
        pub fn always_retry() -> Self {
            Self {
                retry_choices: vec![RetryChoice::Retry; 16],
                exhausted_choices: vec![ExhaustedChoice::Skip; 4],
                ..Default::default()
            }
        }
    }

    impl OperatorPrompt for ScriptedOperator {
        fn on_call_failure(
            &mut self,
            stage: &str,
            _error: &str,
            attempt: u32,
            _max_attempts: u32,
        ) -> Result<RetryChoice> {
            self.failures_seen.push((stage.to_string(), attempt));
            if self.retry_choices.is_empty() {
                return Err(LensError::Aborted("script ran out of retry choices".into()));
            }
            Ok(self.retry_choices.remove(0))
        }

        fn on_retries_exhausted(&mut self, stage: &str, _error: &str) -> Result<ExhaustedChoice> {
            self.exhausted_seen.push(stage.to_string());
            if self.exhausted_choices.is_empty() {
                return Err(LensError::Aborted(
                    "script ran out of exhausted choices".into(),
                ));
            }
            Ok(self.exhausted_choices.remove(0))
        }

        fn on_save_exhausted(&mut self, _record_json: &str) -> Result<LossChoice> {
            self.loss_seen += 1;
            if self.loss_choices.is_empty() {
                return Err(LensError::Aborted("script ran out of loss choices".into()));
            }
            Ok(self.loss_choices.remove(0))
        }
    }
}

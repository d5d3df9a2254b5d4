use std::path::PathBuf;

use thiserror::Error;

use crate::anthropic::AnthropicError;

/// Tipo de resultado do crate. Módulos de biblioteca retornam este tipo; o
/// binário embrulha em `anyhow` no nível superior.
pub type Result<T, E = LensError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LensError {
    #[error("Config error: {0}")]
    Config(String),

    /// Um registro de feedback no arquivo de entrada falhou na validação.
    /// Fatal antes de qualquer item ser processado.
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// Alinhamento foi solicitado mas nenhum documento de estratégia
    /// utilizável está carregado.
    #[error(
        "No normalized strategy available at {0}. Run `prioritylens normalize` or pass --no-alignment"
    )]
    StrategyMissing(PathBuf),

    /// `resume` foi chamado para um item sem suspensão armazenada. Resume é
    /// one-shot por suspensão; um segundo resume do mesmo id cai aqui.
    #[error("No pending suspension for item {0}")]
    NoPendingSuspension(String),

    /// O operador escolheu abortar. O progresso de todos os itens anteriores
    /// já foi persistido quando este erro é levantado.
    #[error("Aborted by operator: {0}")]
    Aborted(String),

    #[error("Anthropic API error: {0}")]
    Anthropic(#[from] AnthropicError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl LensError {
    /// Se este erro é um aborto explícito do operador (em oposição a uma
    /// falha que o processo encontrou sozinho).
    pub fn is_abort(&self) -> bool {
        matches!(self, LensError::Aborted(_))
    }
}

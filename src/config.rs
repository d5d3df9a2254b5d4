//! Configuração carregada a partir de `prioritylens.toml`.
//!
//! Valores não presentes no arquivo usam defaults sensíveis. A variável de
//! ambiente `ANTHROPIC_API_KEY` tem precedência sobre o arquivo.

use anyhow::Result;
use std::path::Path;

use serde::Deserialize;

/// Configuração de nível superior carregada de `prioritylens.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LensConfig {
    /// Chave da API Anthropic.
    #[serde(default)]
    pub api_key: String,

    /// Modelo usado nas chamadas de classificação por item.
    #[serde(default = "default_fast_model")]
    pub classification_model: String,

    /// Modelo usado nas chamadas de alinhamento por item.
    #[serde(default = "default_fast_model")]
    pub alignment_model: String,

    /// Modelo usado na extração one-shot de transcrição.
    #[serde(default = "default_capable_model")]
    pub extraction_model: String,

    /// Modelo usado na normalização one-shot da estratégia.
    #[serde(default = "default_capable_model")]
    pub normalization_model: String,

    /// Máximo de tentativas por chamada de modelo antes de a escalação
    /// forçar skip/abort.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Documento de estratégia fonte alimentado ao `normalize`.
    #[serde(default = "default_strategy_file")]
    pub strategy_file: String,

    /// Estratégia normalizada produzida pelo `normalize` e lida no
    /// alinhamento.
    #[serde(default = "default_normalized_strategy_file")]
    pub normalized_strategy_file: String,
}

fn default_fast_model() -> String {
    "claude-haiku-4-5-20251001".to_string()
}

fn default_capable_model() -> String {
    "claude-sonnet-4-6".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_strategy_file() -> String {
    "business_docs/strategy.md".to_string()
}

fn default_normalized_strategy_file() -> String {
    "strategy_normalized.json".to_string()
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            classification_model: default_fast_model(),
            alignment_model: default_fast_model(),
            extraction_model: default_capable_model(),
            normalization_model: default_capable_model(),
            max_retries: default_max_retries(),
            strategy_file: default_strategy_file(),
            normalized_strategy_file: default_normalized_strategy_file(),
        }
    }
}

impl LensConfig {
    /// Carrega a configuração de `prioritylens.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("prioritylens.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<LensConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo para a chave.
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            if !key.is_empty() {
                config.api_key = key;
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = LensConfig::default();
        assert_eq!(config.classification_model, "claude-haiku-4-5-20251001");
        assert_eq!(config.extraction_model, "claude-sonnet-4-6");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.strategy_file, "business_docs/strategy.md");
        assert_eq!(config.normalized_strategy_file, "strategy_normalized.json");
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_key = "sk-test-123"
            max_retries = 5
            strategy_file = "docs/strategy.md"
        "#;
        let config: LensConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key, "sk-test-123");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.strategy_file, "docs/strategy.md");
        assert_eq!(config.alignment_model, "claude-haiku-4-5-20251001");
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LensConfig::load_from(&dir.path().join("prioritylens.toml")).unwrap();
        assert_eq!(config.max_retries, 3);
    }
}

//! Documento de estratégia normalizado e seu cache controlado por mtime.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};

/// Tipo de elemento estratégico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyItemType {
    Objective,
    Metric,
    Theme,
    Persona,
    AntiGoal,
    Initiative,
}

impl fmt::Display for StrategyItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyItemType::Objective => "objective",
            StrategyItemType::Metric => "metric",
            StrategyItemType::Theme => "theme",
            StrategyItemType::Persona => "persona",
            StrategyItemType::AntiGoal => "anti-goal",
            StrategyItemType::Initiative => "initiative",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Critical,
    High,
    Medium,
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Importance::Critical => "critical",
            Importance::High => "high",
            Importance::Medium => "medium",
        };
        f.write_str(s)
    }
}

/// Um elemento estratégico, por exemplo um objetivo ou um anti-objetivo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyItem {
    /// Id sequencial como "S1", global entre tipos.
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: StrategyItemType,
    pub title: String,
    pub description: String,
    pub importance: Importance,
}

/// Documento de estratégia normalizado completo, produzido e atualizado
/// externamente em disco.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedStrategy {
    pub vision: String,
    pub time_horizon: String,
    pub items: Vec<StrategyItem>,
}

impl NormalizedStrategy {
    /// Renderiza a estratégia como contexto para a capacidade de
    /// alinhamento, no layout esperado pelo prompt de alinhamento.
    pub fn as_context(&self) -> String {
        let mut items_text = String::new();
        for item in &self.items {
            items_text.push_str(&format!(
                "- {}: [{}] {} (importance: {})\n",
                item.id, item.item_type, item.title, item.importance
            ));
            if item.description != item.title {
                items_text.push_str(&format!("  Description: {}\n", item.description));
            }
        }
        format!(
            "## Normalized Strategy\n\nVision: {}\nTime Horizon: {}\n\nStrategic Items:\n{}",
            self.vision, self.time_horizon, items_text
        )
    }
}

/// Cache em memória da estratégia, chaveado pelo mtime do arquivo fonte.
///
/// Recarrega exatamente quando o mtime muda, então edições entre execuções
/// são captadas sem re-parsear a cada item. Pertence ao estágio de
/// alinhamento, não é estado global ambiente.
pub struct StrategyCache {
    path: PathBuf,
    cached: Option<(SystemTime, NormalizedStrategy)>,
}

impl StrategyCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Carrega a estratégia, reusando a cópia em cache enquanto o mtime do
    /// arquivo não mudar. Arquivo ausente, ilegível ou documento
    /// estruturalmente inválido falham todos de forma dura; o alinhamento
    /// não pode prosseguir sobre um default.
    pub fn load(&mut self) -> Result<&NormalizedStrategy> {
        if !self.path.exists() {
            return Err(LensError::StrategyMissing(self.path.clone()));
        }

        let mtime = fs::metadata(&self.path)?.modified()?;
        let stale = match &self.cached {
            Some((cached_mtime, _)) => *cached_mtime != mtime,
            None => true,
        };

        if stale {
            let contents = fs::read_to_string(&self.path)?;
            let strategy: NormalizedStrategy = serde_json::from_str(&contents)?;
            if strategy.items.is_empty() {
                return Err(LensError::InputValidation(format!(
                    "strategy file {} has no items",
                    self.path.display()
                )));
            }
            self.cached = Some((mtime, strategy));
        }

        // O slot do cache está sempre preenchido neste ponto.
        match &self.cached {
            Some((_, strategy)) => Ok(strategy),
            None => Err(LensError::StrategyMissing(self.path.clone())),
        }
    }
}

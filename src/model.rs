//! Modelo de dados central: itens de feedback, o estado de classificação
//! conduzido pelo workflow e as saídas estruturadas das chamadas de modelo.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Uma categoria de feedback. Os nomes serializados correspondem ao formato
/// de saída persistido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Opportunity,
    Pain,
    Bug,
    Usability,
    Performance,
    #[serde(rename = "New Feature Request")]
    NewFeatureRequest,
    #[serde(rename = "Pricing Concern")]
    PricingConcern,
}

impl Category {
    /// Todas as categorias na ordem de exibição. O prompt de revisão as
    /// numera de 1 a 7.
    pub const ALL: [Category; 7] = [
        Category::Opportunity,
        Category::Pain,
        Category::Bug,
        Category::Usability,
        Category::Performance,
        Category::NewFeatureRequest,
        Category::PricingConcern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Opportunity => "Opportunity",
            Category::Pain => "Pain",
            Category::Bug => "Bug",
            Category::Usability => "Usability",
            Category::Performance => "Performance",
            Category::NewFeatureRequest => "New Feature Request",
            Category::PricingConcern => "Pricing Concern",
        }
    }

    /// Busca pelo índice 1-based do prompt de revisão.
    pub fn from_index(index: usize) -> Option<Category> {
        (1..=Self::ALL.len()).contains(&index).then(|| Self::ALL[index - 1])
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimativa de urgência baseada em impacto e, depois da matriz de
/// prioridade, a prioridade final derivada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

/// Medida categórica de aderência estratégica. `AntiGoal` marca contradição
/// explícita de um anti-objetivo declarado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignmentScore {
    High,
    Medium,
    Low,
    #[serde(rename = "Anti-goal")]
    AntiGoal,
}

impl fmt::Display for AlignmentScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentScore::High => write!(f, "High"),
            AlignmentScore::Medium => write!(f, "Medium"),
            AlignmentScore::Low => write!(f, "Low"),
            AlignmentScore::AntiGoal => write!(f, "Anti-goal"),
        }
    }
}

/// O estágio mais distante que um item alcançou.
///
/// `Skipped` é terminal e pode ser atingido a qualquer momento depois que a
/// classificação começa, pulando todos os estágios restantes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Classified,
    Aligned,
    Prioritized,
    Reviewed,
    Saved,
    Skipped,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Pending => "pending",
            Status::Classified => "classified",
            Status::Aligned => "aligned",
            Status::Prioritized => "prioritized",
            Status::Reviewed => "reviewed",
            Status::Saved => "saved",
            Status::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Registro de entrada imutável. Nunca alterado após a ingestão.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub id: String,
    pub text: String,
    pub source: String,
    pub timestamp: String,
}

/// O registro mutável conduzido pelo workflow para um item.
///
/// Cada campo é escrito uma vez pelo estágio que o possui, exceto
/// `suggested_priority`, cujo significado muda deliberadamente de "estimativa
/// de impacto" para "prioridade final derivada" quando a matriz roda.
/// `impact_priority` preserva o valor pré-matriz para auditoria.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationState {
    pub feedback: FeedbackItem,

    // Escritos pelo estágio de classificação.
    pub suggested_category: Option<Category>,
    pub suggested_priority: Option<Priority>,
    pub reasoning: Option<String>,

    // Escritos pelo estágio de alinhamento (apenas quando habilitado).
    pub alignment_score: Option<AlignmentScore>,
    pub alignment_reasoning: Option<String>,
    pub related_strategy_items: Option<Vec<String>>,

    // Escritos pelo passo da matriz de prioridade.
    pub impact_priority: Option<Priority>,
    pub priority_derivation: Option<String>,

    // Escritos no ponto de suspensão da revisão humana.
    pub final_category: Option<Category>,
    pub final_priority: Option<Priority>,
    pub human_reasoning: Option<String>,

    pub status: Status,
}

impl ClassificationState {
    pub fn new(feedback: FeedbackItem) -> Self {
        Self {
            feedback,
            suggested_category: None,
            suggested_priority: None,
            reasoning: None,
            alignment_score: None,
            alignment_reasoning: None,
            related_strategy_items: None,
            impact_priority: None,
            priority_derivation: None,
            final_category: None,
            final_priority: None,
            human_reasoning: None,
            status: Status::Pending,
        }
    }
}

/// Saída estruturada da capacidade de classificação.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub priority: Priority,
    pub reasoning: String,
}

/// Saída estruturada da capacidade de alinhamento.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentAssessment {
    pub alignment_score: AlignmentScore,
    pub related_strategy_items: Vec<String>,
    pub reasoning: String,
}

/// Uma linha no JSONL de saída: os campos originais do feedback mais todas as
/// decisões tomadas sobre o item. Nulls são escritos explicitamente para que
/// o esquema seja estável entre execuções com e sem alinhamento.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRecord {
    #[serde(flatten)]
    pub feedback: FeedbackItem,
    pub category: Category,
    pub priority: Priority,
    pub agent_reasoning: Option<String>,
    pub human_reasoning: Option<String>,
    pub impact_priority: Option<Priority>,
    pub alignment_score: Option<AlignmentScore>,
    pub alignment_reasoning: Option<String>,
    pub related_strategy_items: Option<Vec<String>>,
    pub priority_derivation: Option<String>,
    pub classified_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> FeedbackItem {
        FeedbackItem {
            id: "t1".into(),
            text: "App crashes on submit".into(),
            source: "interview".into(),
            timestamp: "2025-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn category_serde_names_match_output_format() {
        assert_eq!(
            serde_json::to_string(&Category::NewFeatureRequest).unwrap(),
            r#""New Feature Request""#
        );
        assert_eq!(
            serde_json::to_string(&Category::PricingConcern).unwrap(),
            r#""Pricing Concern""#
        );
        let parsed: Category = serde_json::from_str(r#""Bug""#).unwrap();
        assert_eq!(parsed, Category::Bug);
    }

    #[test]
    fn category_from_index_covers_prompt_range() {
        assert_eq!(Category::from_index(1), Some(Category::Opportunity));
        assert_eq!(Category::from_index(7), Some(Category::PricingConcern));
        assert_eq!(Category::from_index(0), None);
        assert_eq!(Category::from_index(8), None);
    }

    #[test]
    fn anti_goal_serde_name() {
        assert_eq!(
            serde_json::to_string(&AlignmentScore::AntiGoal).unwrap(),
            r#""Anti-goal""#
        );
        let parsed: AlignmentScore = serde_json::from_str(r#""Anti-goal""#).unwrap();
        assert_eq!(parsed, AlignmentScore::AntiGoal);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Prioritized).unwrap(), r#""prioritized""#);
        assert_eq!(Status::Skipped.to_string(), "skipped");
    }

    #[test]
    fn new_state_is_pending_with_no_stage_fields() {
        let state = ClassificationState::new(item());
        assert_eq!(state.status, Status::Pending);
        assert!(state.suggested_category.is_none());
        assert!(state.final_priority.is_none());
    }

    #[test]
    fn classification_state_roundtrip() {
        let mut state = ClassificationState::new(item());
        state.suggested_category = Some(Category::Bug);
        state.suggested_priority = Some(Priority::High);
        state.reasoning = Some("crash on a core workflow".into());
        state.status = Status::Classified;

        let json = serde_json::to_string(&state).unwrap();
        let parsed: ClassificationState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.feedback.id, "t1");
        assert_eq!(parsed.suggested_category, Some(Category::Bug));
        assert_eq!(parsed.status, Status::Classified);
    }

    #[test]
    fn saved_record_flattens_feedback_and_keeps_nulls() {
        let record = SavedRecord {
            feedback: item(),
            category: Category::Bug,
            priority: Priority::High,
            agent_reasoning: Some("crash".into()),
            human_reasoning: None,
            impact_priority: None,
            alignment_score: None,
            alignment_reasoning: None,
            related_strategy_items: None,
            priority_derivation: None,
            classified_at: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""id":"t1""#));
        assert!(json.contains(r#""category":"Bug""#));
        // Campos de alinhamento ficam presentes como null em execuções
        // somente-classificação.
        assert!(json.contains(r#""alignment_score":null"#));
    }

    #[test]
    fn classification_parses_model_output() {
        let json = r#"{"category":"New Feature Request","priority":"Medium","reasoning":"explicit ask"}"#;
        let c: Classification = serde_json::from_str(json).unwrap();
        assert_eq!(c.category, Category::NewFeatureRequest);
        assert_eq!(c.priority, Priority::Medium);
    }
}

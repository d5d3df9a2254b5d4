//! Log CSV append-only das decisões de revisão humana.
//!
//! Uma linha por item revisado, registrando o que o modelo sugeriu, o que o
//! humano decidiu e se concordaram. O log acumula entre execuções para que a
//! deriva do classificador possa ser medida ao longo do tempo, e o esquema de
//! colunas é estável para consumidores externos (ver `analyze`).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::model::{AlignmentScore, Category, ClassificationState, Priority};

/// Uma linha de auditoria. A ordem dos campos é a ordem das colunas.
///
/// `final_priority` repete a sugestão pós-matriz do agente; `human_category` e
/// `human_priority` carregam a decisão do revisor.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub feedback_id: String,
    pub timestamp: DateTime<Utc>,
    pub agent_category: Category,
    pub agent_priority: Priority,
    pub agent_reasoning: String,
    pub impact_priority: Option<Priority>,
    pub alignment_score: Option<AlignmentScore>,
    pub final_priority: Priority,
    pub human_category: Category,
    pub human_priority: Priority,
    pub category_match: bool,
    pub priority_match: bool,
    pub full_match: bool,
}

impl DecisionRecord {
    /// Constrói uma linha a partir de um estado revisado. A prioridade
    /// sugerida é o valor pós-matriz quando o alinhamento rodou, então
    /// `priority_match` compara a decisão humana contra o que foi de fato
    /// mostrado ao revisor.
    pub fn from_state(state: &ClassificationState) -> Option<Self> {
        let agent_category = state.suggested_category?;
        let agent_priority = state.suggested_priority?;
        let human_category = state.final_category?;
        let human_priority = state.final_priority?;
        let category_match = agent_category == human_category;
        let priority_match = agent_priority == human_priority;
        Some(Self {
            feedback_id: state.feedback.id.clone(),
            timestamp: Utc::now(),
            agent_category,
            agent_priority,
            agent_reasoning: state.reasoning.clone().unwrap_or_default(),
            impact_priority: state.impact_priority,
            alignment_score: state.alignment_score,
            final_priority: agent_priority,
            human_category,
            human_priority,
            category_match,
            priority_match,
            full_match: category_match && priority_match,
        })
    }
}

pub struct DecisionLog {
    path: PathBuf,
}

impl DecisionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acrescenta uma linha, escrevendo o cabeçalho apenas quando o arquivo é
    /// novo ou está vazio.
    pub fn append(&self, record: &DecisionRecord) -> Result<()> {
        let write_header = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeedbackItem, Status};
    use std::fs;
    use tempfile::tempdir;

    fn reviewed_state() -> ClassificationState {
        let mut state = ClassificationState::new(FeedbackItem {
            id: "t1".into(),
            text: "App crashes on submit".into(),
            source: "interview".into(),
            timestamp: "2025-01-01T00:00:00Z".into(),
        });
        state.suggested_category = Some(Category::Bug);
        state.suggested_priority = Some(Priority::High);
        state.reasoning = Some("crash on a core workflow".into());
        state.final_category = Some(Category::Bug);
        state.final_priority = Some(Priority::High);
        state.status = Status::Reviewed;
        state
    }

    #[test]
    fn agreement_sets_all_match_flags() {
        let record = DecisionRecord::from_state(&reviewed_state()).unwrap();
        assert!(record.category_match);
        assert!(record.priority_match);
        assert!(record.full_match);
    }

    #[test]
    fn priority_override_clears_priority_and_full_match() {
        let mut state = reviewed_state();
        state.final_priority = Some(Priority::Medium);
        let record = DecisionRecord::from_state(&state).unwrap();
        assert!(record.category_match);
        assert!(!record.priority_match);
        assert!(!record.full_match);
        assert_eq!(record.human_priority, Priority::Medium);
        assert_eq!(record.final_priority, Priority::High);
    }

    #[test]
    fn category_override_clears_category_and_full_match() {
        let mut state = reviewed_state();
        state.final_category = Some(Category::Usability);
        let record = DecisionRecord::from_state(&state).unwrap();
        assert!(!record.category_match);
        assert!(record.priority_match);
        assert!(!record.full_match);
        assert_eq!(record.human_category, Category::Usability);
    }

    #[test]
    fn unreviewed_state_yields_no_record() {
        let mut state = reviewed_state();
        state.final_category = None;
        assert!(DecisionRecord::from_state(&state).is_none());
    }

    #[test]
    fn header_matches_stable_column_order() {
        let dir = tempdir().unwrap();
        let log = DecisionLog::new(dir.path().join("decisions.csv"));
        let record = DecisionRecord::from_state(&reviewed_state()).unwrap();
        log.append(&record).unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            contents.lines().next().unwrap(),
            "feedback_id,timestamp,agent_category,agent_priority,agent_reasoning,\
             impact_priority,alignment_score,final_priority,human_category,\
             human_priority,category_match,priority_match,full_match"
        );
    }

    #[test]
    fn header_written_once_across_appends() {
        let dir = tempdir().unwrap();
        let log = DecisionLog::new(dir.path().join("decisions.csv"));

        let record = DecisionRecord::from_state(&reviewed_state()).unwrap();
        log.append(&record).unwrap();
        log.append(&record).unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("feedback_id,timestamp,agent_category"));
        assert!(lines[1].contains("t1"));
        assert!(!lines[2].starts_with("feedback_id"));
    }

    #[test]
    fn optional_columns_empty_without_alignment() {
        let dir = tempdir().unwrap();
        let log = DecisionLog::new(dir.path().join("decisions.csv"));
        let record = DecisionRecord::from_state(&reviewed_state()).unwrap();
        log.append(&record).unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        let row = contents.lines().nth(1).unwrap();
        // impact_priority e alignment_score serializam como células vazias.
        assert!(row.contains(",,,High,Bug,High,true"));
    }

    #[test]
    fn alignment_columns_present_when_set() {
        let dir = tempdir().unwrap();
        let log = DecisionLog::new(dir.path().join("decisions.csv"));
        let mut state = reviewed_state();
        state.impact_priority = Some(Priority::High);
        state.alignment_score = Some(AlignmentScore::Medium);
        let record = DecisionRecord::from_state(&state).unwrap();
        log.append(&record).unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        let row = contents.lines().nth(1).unwrap();
        assert!(row.contains("High,Medium,High,Bug,High"));
    }
}

//! O workflow por item: classifica, opcionalmente alinha e deriva a
//! prioridade final, suspende para revisão humana e então retoma com a
//! decisão do humano e persiste o resultado.
//!
//! A separação suspend/resume é o ponto estrutural do design. `start` roda
//! todos os estágios automatizados e estaciona o item no armazenamento de
//! suspensões; `resume` consome a suspensão exatamente uma vez. Entre as
//! duas chamadas o estado vive em disco, então um crash durante a revisão
//! custa apenas a própria revisão.

use chrono::Utc;

use crate::anthropic::MessageSender;
use crate::decisions::{DecisionLog, DecisionRecord};
use crate::error::{LensError, Result};
use crate::matrix;
use crate::model::{ClassificationState, FeedbackItem, SavedRecord, Status};
use crate::operator::OperatorPrompt;
use crate::persist::{PersistCascade, SaveStatus};
use crate::review::{HumanDecision, ReviewPayload};
use crate::stages::{AlignStage, ClassifyOutcome, ClassifyStage};
use crate::workflow::checkpoint::SuspensionStore;

/// Como `start` deixou o item.
#[derive(Debug)]
pub enum StartOutcome {
    /// Estágios automatizados terminaram; o item aguarda revisão humana.
    Suspended(ReviewPayload),
    /// O operador pulou o item durante a classificação.
    Skipped,
}

/// Como `resume` deixou o item.
#[derive(Debug)]
pub enum ResumeOutcome {
    Saved(SaveStatus),
    Skipped,
}

pub struct WorkflowEngine<C> {
    client: C,
    classify: ClassifyStage,
    align: Option<AlignStage>,
    suspensions: SuspensionStore,
    cascade: PersistCascade,
    decisions: DecisionLog,
}

impl<C: MessageSender> WorkflowEngine<C> {
    pub fn new(
        client: C,
        classify: ClassifyStage,
        align: Option<AlignStage>,
        suspensions: SuspensionStore,
        cascade: PersistCascade,
        decisions: DecisionLog,
    ) -> Self {
        Self {
            client,
            classify,
            align,
            suspensions,
            cascade,
            decisions,
        }
    }

    pub fn alignment_enabled(&self) -> bool {
        self.align.is_some()
    }

    /// Roda os estágios automatizados de um item até o portão de revisão.
    pub async fn start(
        &mut self,
        operator: &mut dyn OperatorPrompt,
        item: FeedbackItem,
    ) -> Result<StartOutcome> {
        let mut state = ClassificationState::new(item);

        match self.classify.run(&self.client, operator, &state.feedback).await? {
            ClassifyOutcome::Classified(c) => {
                state.suggested_category = Some(c.category);
                state.suggested_priority = Some(c.priority);
                state.reasoning = Some(c.reasoning);
                state.status = Status::Classified;
            }
            ClassifyOutcome::Skipped => {
                state.status = Status::Skipped;
                return Ok(StartOutcome::Skipped);
            }
        }

        if let Some(align) = &mut self.align {
            let assessment = align.run(&self.client, operator, &state).await?;
            state.alignment_score = Some(assessment.alignment_score);
            state.alignment_reasoning = Some(assessment.reasoning);
            state.related_strategy_items = Some(assessment.related_strategy_items);
            state.status = Status::Aligned;

            let derivation = matrix::derive_loose(state.suggested_priority, state.alignment_score);
            if derivation.defaulted {
                eprintln!(
                    "  Warning: priority derivation fell back to Medium for {}: {}",
                    state.feedback.id, derivation.trace
                );
            }
            // A estimativa de impacto sai de cena e a prioridade sugerida
            // passa a ser o resultado da matriz, que é o que o revisor vê.
            state.impact_priority = state.suggested_priority;
            state.suggested_priority = Some(derivation.final_priority);
            state.priority_derivation = Some(derivation.trace);
            state.status = Status::Prioritized;
        }

        let payload = ReviewPayload::from_state(&state).ok_or_else(|| {
            LensError::InputValidation(format!(
                "item {} reached the review gate without a classification",
                state.feedback.id
            ))
        })?;
        self.suspensions.put(state)?;
        Ok(StartOutcome::Suspended(payload))
    }

    /// Payload de revisão de um item já suspenso, se existir. Usado para
    /// reentregar suspensões deixadas por uma execução interrompida.
    pub fn pending_suspension(&self, id: &str) -> Option<ReviewPayload> {
        self.suspensions.get(id).and_then(ReviewPayload::from_state)
    }

    pub fn pending_count(&self) -> usize {
        self.suspensions.len()
    }

    /// Aplica a decisão humana a um item suspenso e persiste o resultado.
    ///
    /// Consome a suspensão exatamente uma vez. Uma decisão de abortar
    /// re-estaciona o item para a próxima execução revisá-lo de novo.
    pub fn resume(
        &mut self,
        operator: &mut dyn OperatorPrompt,
        id: &str,
        decision: HumanDecision,
    ) -> Result<ResumeOutcome> {
        let mut state = self.suspensions.take(id)?;

        let (category, priority, human_reasoning) = match decision {
            HumanDecision::Skip => {
                state.status = Status::Skipped;
                return Ok(ResumeOutcome::Skipped);
            }
            HumanDecision::Abort => {
                self.suspensions.put(state)?;
                return Err(LensError::Aborted("review".into()));
            }
            HumanDecision::Approve {
                category,
                priority,
                reasoning,
            } => (category, priority, reasoning),
        };

        state.final_category = category.or(state.suggested_category);
        state.final_priority = priority.or(state.suggested_priority);
        state.human_reasoning = human_reasoning;
        state.status = Status::Reviewed;

        match DecisionRecord::from_state(&state) {
            Some(record) => {
                if let Err(e) = self.decisions.append(&record) {
                    eprintln!("  Warning: could not record review decision: {e}");
                }
            }
            None => {
                eprintln!(
                    "  Warning: incomplete review state for {id}; decision not recorded"
                );
            }
        }

        let (Some(category), Some(priority)) = (state.final_category, state.final_priority) else {
            return Err(LensError::InputValidation(format!(
                "reviewed item {id} has no category or priority"
            )));
        };
        let record = SavedRecord {
            feedback: state.feedback.clone(),
            category,
            priority,
            agent_reasoning: state.reasoning.clone(),
            human_reasoning: state.human_reasoning.clone(),
            impact_priority: state.impact_priority,
            alignment_score: state.alignment_score,
            alignment_reasoning: state.alignment_reasoning.clone(),
            related_strategy_items: state.related_strategy_items.clone(),
            priority_derivation: state.priority_derivation.clone(),
            classified_at: Utc::now(),
        };

        let status = self.cascade.append(&record, operator)?;
        state.status = Status::Saved;
        Ok(ResumeOutcome::Saved(status))
    }
}

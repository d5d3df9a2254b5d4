//! Matriz de prioridade: mapeia (impacto, alinhamento) para o nível final.
//!
//! O princípio é degradação monotônica: o alinhamento pode rebaixar ou
//! preservar a prioridade implicada pelo impacto mas nunca elevá-la, e um
//! alinhamento Anti-goal trava o resultado em Low independente do impacto.

use crate::model::{AlignmentScore, Priority};

/// Consulta a prioridade final para um par (impacto, alinhamento) definido.
pub fn derive(impact: Priority, alignment: AlignmentScore) -> Priority {
    use AlignmentScore as A;
    use Priority as P;

    match (impact, alignment) {
        (P::High, A::High) => P::High,
        (P::High, A::Medium) => P::High,
        (P::High, A::Low) => P::Medium,
        (P::High, A::AntiGoal) => P::Low,

        (P::Medium, A::High) => P::Medium,
        (P::Medium, A::Medium) => P::Medium,
        (P::Medium, A::Low) => P::Low,
        (P::Medium, A::AntiGoal) => P::Low,

        (P::Low, _) => P::Low,
    }
}

/// Resultado de uma consulta à matriz, incluindo o trace legível registrado
/// no estado do item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    pub final_priority: Priority,
    pub trace: String,
    /// Verdadeiro quando uma entrada estava ausente e o default seguro
    /// (Medium) foi usado. Chamadores registram isso como diagnóstico; indica
    /// violação de contrato a montante, não uma consulta normal.
    pub defaulted: bool,
}

/// Consulta tolerante a entradas ausentes. Impacto ou alinhamento ausente
/// resolve para Medium em vez de panicar.
pub fn derive_loose(impact: Option<Priority>, alignment: Option<AlignmentScore>) -> Derivation {
    match (impact, alignment) {
        (Some(i), Some(a)) => {
            let final_priority = derive(i, a);
            Derivation {
                final_priority,
                trace: format!("(impact: {i}, alignment: {a}) = {final_priority}"),
                defaulted: false,
            }
        }
        (i, a) => {
            let impact_label = i.map_or_else(|| "unknown".to_string(), |p| p.to_string());
            let alignment_label = a.map_or_else(|| "unknown".to_string(), |s| s.to_string());
            Derivation {
                final_priority: Priority::Medium,
                trace: format!("(impact: {impact_label}, alignment: {alignment_label}) = Medium"),
                defaulted: true,
            }
        }
    }
}

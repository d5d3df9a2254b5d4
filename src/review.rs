//! Revisão humana: o payload de suspensão mostrado ao revisor e a gramática
//! de escolha em linha única para respondê-lo.
//!
//! A gramática empacota a decisão inteira em uma linha: `s` pula, `a`
//! aborta, vazio ou `y` aprova como sugerido, um dígito 1-7 sobrescreve a
//! categoria, `h`/`m`/`l` sobrescreve a prioridade, `r` anexa raciocínio.
//! Os tokens combinam, então `3hr` significa "categoria 3, prioridade High
//! e me pergunte o raciocínio". `s` e `a` vencem qualquer combinação.

use console::Style;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;

use crate::error::{LensError, Result};
use crate::model::{AlignmentScore, Category, ClassificationState, FeedbackItem, Priority};

/// Tudo que o revisor precisa ver para um item suspenso.
#[derive(Debug, Clone)]
pub struct ReviewPayload {
    pub feedback: FeedbackItem,
    pub suggested_category: Category,
    pub suggested_priority: Priority,
    pub reasoning: String,
    pub alignment: Option<AlignmentDetail>,
}

/// Contexto extra mostrado quando o estágio de alinhamento rodou.
#[derive(Debug, Clone)]
pub struct AlignmentDetail {
    pub impact_priority: Priority,
    pub alignment_score: AlignmentScore,
    pub reasoning: String,
    pub related_strategy_items: Vec<String>,
    pub derivation: String,
}

impl ReviewPayload {
    /// Projeta um estado suspenso na sua visão de revisão. Retorna `None`
    /// quando o estado nunca terminou a classificação (e portanto não tem
    /// nada a mostrar).
    pub fn from_state(state: &ClassificationState) -> Option<Self> {
        Some(Self {
            feedback: state.feedback.clone(),
            suggested_category: state.suggested_category?,
            suggested_priority: state.suggested_priority?,
            reasoning: state.reasoning.clone().unwrap_or_default(),
            alignment: state.alignment_score.map(|score| AlignmentDetail {
                impact_priority: state.impact_priority.unwrap_or(Priority::Medium),
                alignment_score: score,
                reasoning: state.alignment_reasoning.clone().unwrap_or_default(),
                related_strategy_items: state.related_strategy_items.clone().unwrap_or_default(),
                derivation: state.priority_derivation.clone().unwrap_or_default(),
            }),
        })
    }
}

/// A resolução do revisor para uma suspensão.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HumanDecision {
    Skip,
    Abort,
    Approve {
        category: Option<Category>,
        priority: Option<Priority>,
        reasoning: Option<String>,
    },
}

/// Forma parseada de uma linha de escolha. `wants_reasoning` é resolvido em
/// um prompt de texto livre pelo coletor antes da decisão ser produzida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedChoice {
    Skip,
    Abort,
    Approve {
        category: Option<Category>,
        priority: Option<Priority>,
        wants_reasoning: bool,
    },
}

/// Parseia uma linha de escolha. Retorna uma reclamação legível em entrada
/// inválida para o coletor poder perguntar de novo.
pub fn parse_choice(line: &str) -> Result<ParsedChoice, String> {
    let line = line.trim().to_lowercase();
    if line.contains('s') {
        return Ok(ParsedChoice::Skip);
    }
    if line.contains('a') {
        return Ok(ParsedChoice::Abort);
    }

    let mut category = None;
    let mut priority = None;
    let mut wants_reasoning = false;
    for ch in line.chars() {
        match ch {
            'y' | ' ' => {}
            'h' => priority = Some(Priority::High),
            'm' => priority = Some(Priority::Medium),
            'l' => priority = Some(Priority::Low),
            'r' => wants_reasoning = true,
            d if d.is_ascii_digit() => {
                let index = d.to_digit(10).map(|n| n as usize).unwrap_or(0);
                match Category::from_index(index) {
                    Some(c) => category = Some(c),
                    None => return Err(format!("category number must be 1-{}", Category::ALL.len())),
                }
            }
            other => return Err(format!("unrecognized choice character '{other}'")),
        }
    }
    Ok(ParsedChoice::Approve {
        category,
        priority,
        wants_reasoning,
    })
}

/// Coleta decisões de revisão. A implementação CLI bloqueia na entrada do
/// terminal; os testes a roteirizam.
pub trait ReviewCollector {
    fn collect(
        &mut self,
        payload: &ReviewPayload,
        index: usize,
        total: usize,
    ) -> Result<HumanDecision>;
}

/// Revisor de terminal. Imprime o payload da suspensão e repete até a linha
/// de escolha parsear.
#[derive(Default)]
pub struct CliReviewer;

impl CliReviewer {
    fn display(&self, payload: &ReviewPayload, index: usize, total: usize) {
        let bold = Style::new().bold();
        let dim = Style::new().dim();
        let cyan = Style::new().cyan();

        println!();
        println!("{}", bold.apply_to(format!("[{index}/{total}] Review: {}", payload.feedback.id)));
        println!("{}", dim.apply_to(format!("  Source: {} ({})", payload.feedback.source, payload.feedback.timestamp)));
        println!();
        println!("  {}", payload.feedback.text);
        println!();
        println!(
            "  Suggested: {} / {}",
            cyan.apply_to(payload.suggested_category),
            cyan.apply_to(payload.suggested_priority)
        );
        println!("  Reasoning: {}", payload.reasoning);

        if let Some(alignment) = &payload.alignment {
            println!();
            println!(
                "  Impact priority: {}  Alignment: {}",
                alignment.impact_priority, alignment.alignment_score
            );
            println!("  Derivation: {}", alignment.derivation);
            if !alignment.related_strategy_items.is_empty() {
                println!(
                    "  Related strategy items: {}",
                    alignment.related_strategy_items.join(", ")
                );
            }
            println!("  Alignment reasoning: {}", alignment.reasoning);
        }

        println!();
        println!("{}", dim.apply_to("  [Enter/y] approve  [1-7] category  [h/m/l] priority  [r] add reasoning  [s] skip  [a] abort"));
        for (i, c) in Category::ALL.iter().enumerate() {
            println!("{}", dim.apply_to(format!("    {}: {c}", i + 1)));
        }
    }

    fn prompt_line(&self, prompt: &str, allow_empty: bool) -> Result<String> {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(allow_empty)
            .interact_text()
            .map_err(|e| match e {
                dialoguer::Error::IO(io) => LensError::Io(io),
            })
    }
}

impl ReviewCollector for CliReviewer {
    fn collect(
        &mut self,
        payload: &ReviewPayload,
        index: usize,
        total: usize,
    ) -> Result<HumanDecision> {
        self.display(payload, index, total);
        loop {
            let line = self.prompt_line("Your choice", true)?;
            match parse_choice(&line) {
                Ok(ParsedChoice::Skip) => return Ok(HumanDecision::Skip),
                Ok(ParsedChoice::Abort) => return Ok(HumanDecision::Abort),
                Ok(ParsedChoice::Approve {
                    category,
                    priority,
                    wants_reasoning,
                }) => {
                    let reasoning = if wants_reasoning {
                        Some(self.prompt_line("Reasoning", false)?)
                    } else {
                        None
                    };
                    return Ok(HumanDecision::Approve {
                        category,
                        priority,
                        reasoning,
                    });
                }
                Err(complaint) => eprintln!("  Invalid choice: {complaint}. Try again."),
            }
        }
    }
}

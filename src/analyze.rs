//! Métricas de concordância sobre o log de decisões.
//!
//! Lê `decisions.csv` e imprime as três taxas de concordância
//! (categoria, prioridade, completa) e os pares de override mais comuns.
//! Arquivo ausente, vazio ou malformado vira orientação ao usuário, nunca
//! um erro fatal.

use std::collections::HashMap;
use std::path::Path;

use console::Style;
use serde::Deserialize;

use crate::error::Result;

/// Campos exigidos de cada linha do log. Colunas extras são ignoradas;
/// colunas ausentes fazem a desserialização falhar, o que `run_analyze`
/// reporta como arquivo incompatível.
#[derive(Debug, Deserialize)]
struct DecisionRow {
    agent_category: String,
    agent_priority: String,
    human_category: String,
    human_priority: String,
    category_match: bool,
    priority_match: bool,
    full_match: bool,
}

/// Agregado calculado em uma passada sobre o log.
#[derive(Debug, Default)]
pub struct DecisionStats {
    pub total: usize,
    pub category_matches: usize,
    pub priority_matches: usize,
    pub full_matches: usize,
    /// Pares (agente, humano, contagem) onde a categoria divergiu,
    /// mais frequentes primeiro, no máximo cinco.
    pub category_overrides: Vec<(String, String, usize)>,
    pub priority_overrides: Vec<(String, String, usize)>,
}

impl DecisionStats {
    /// Lê o CSV inteiro e agrega. Erros de IO e de esquema sobem para o
    /// chamador decidir como reportar.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut stats = DecisionStats::default();
        let mut category_counts: HashMap<(String, String), usize> = HashMap::new();
        let mut priority_counts: HashMap<(String, String), usize> = HashMap::new();

        for row in reader.deserialize() {
            let row: DecisionRow = row?;
            stats.total += 1;
            if row.category_match {
                stats.category_matches += 1;
            } else {
                *category_counts
                    .entry((row.agent_category, row.human_category))
                    .or_insert(0) += 1;
            }
            if row.priority_match {
                stats.priority_matches += 1;
            } else {
                *priority_counts
                    .entry((row.agent_priority, row.human_priority))
                    .or_insert(0) += 1;
            }
            if row.full_match {
                stats.full_matches += 1;
            }
        }

        stats.category_overrides = top_overrides(category_counts);
        stats.priority_overrides = top_overrides(priority_counts);
        Ok(stats)
    }
}

// Ordena por contagem decrescente e desempata pelo par, para saída estável.
fn top_overrides(counts: HashMap<(String, String), usize>) -> Vec<(String, String, usize)> {
    let mut pairs: Vec<(String, String, usize)> = counts
        .into_iter()
        .map(|((agent, human), count)| (agent, human, count))
        .collect();
    pairs.sort_by(|a, b| {
        b.2.cmp(&a.2)
            .then_with(|| a.0.cmp(&b.0))
            .then_with(|| a.1.cmp(&b.1))
    });
    pairs.truncate(5);
    pairs
}

/// Imprime o relatório de concordância para o log fornecido.
pub fn run_analyze(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Err(_) => {
            eprintln!("Error: {} not found.", path.display());
            eprintln!();
            eprintln!("Run the classifier first to generate decisions:");
            eprintln!("  prioritylens run feedback.json");
            return Ok(());
        }
        Ok(meta) if meta.len() == 0 => {
            eprintln!("Error: {} is empty.", path.display());
            eprintln!();
            eprintln!("Run the classifier to generate decisions:");
            eprintln!("  prioritylens run feedback.json");
            return Ok(());
        }
        Ok(_) => {}
    }

    let stats = match DecisionStats::from_csv(path) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("Error: could not read {}: {e}", path.display());
            eprintln!();
            eprintln!("The file may be corrupted or from an older version.");
            eprintln!("Run the classifier again to regenerate it.");
            return Ok(());
        }
    };

    if stats.total == 0 {
        println!("No decisions logged yet.");
        println!();
        println!("The CSV file exists but contains no decision records.");
        return Ok(());
    }

    let bold = Style::new().bold();
    let total = stats.total;

    println!();
    println!("{}", "═".repeat(50));
    println!(
        "{}",
        bold.apply_to(format!("EVALUATION METRICS - {}", path.display()))
    );
    println!("({total} decisions)");
    println!("{}", "═".repeat(50));
    println!(
        "Category agreement:  {}/{total} ({:.1}%)",
        stats.category_matches,
        percent(stats.category_matches, total)
    );
    println!(
        "Priority agreement:  {}/{total} ({:.1}%)",
        stats.priority_matches,
        percent(stats.priority_matches, total)
    );
    println!(
        "Full agreement:      {}/{total} ({:.1}%)",
        stats.full_matches,
        percent(stats.full_matches, total)
    );

    print_overrides(
        "CATEGORY OVERRIDES (where human disagreed)",
        &stats.category_overrides,
        "Perfect category agreement.",
    );
    print_overrides(
        "PRIORITY OVERRIDES",
        &stats.priority_overrides,
        "Perfect priority agreement.",
    );

    Ok(())
}

fn percent(count: usize, total: usize) -> f64 {
    100.0 * count as f64 / total as f64
}

fn print_overrides(title: &str, overrides: &[(String, String, usize)], empty_message: &str) {
    println!();
    println!("{}", "─".repeat(50));
    println!("{title}");
    println!("{}", "─".repeat(50));
    if overrides.is_empty() {
        println!("  None! {empty_message}");
        return;
    }
    for (agent, human, count) in overrides {
        println!("  {agent} → {human}: {count}x");
    }
}

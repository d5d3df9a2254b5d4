//! Auxiliares de saída no terminal: spinners e linhas de status coloridas.
//!
//! Usa `indicatif` para spinners nas chamadas one-shot ao modelo e `console`
//! para saída colorida durante a execução interativa.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::persist::SaveStatus;

/// Spinner mostrado enquanto uma chamada one-shot (extract, normalize) roda.
pub struct Spinner {
    pb: ProgressBar,
    green: Style,
    red: Style,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    pub fn succeed(&self, message: &str) {
        self.pb.finish_and_clear();
        println!("{} {message}", self.green.apply_to("✓"));
    }

    pub fn fail(&self, message: &str) {
        self.pb.finish_and_clear();
        eprintln!("{} {message}", self.red.apply_to("✗"));
    }
}

/// Log de sessão append-only (`classifier.log`). Falhas de escrita são
/// reportadas no stderr e ignoradas; o log nunca pode parar uma execução.
pub struct SessionLog {
    path: std::path::PathBuf,
}

impl SessionLog {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn session_started(&self) {
        self.separator();
        self.line(&format!("Classification session started: {}", now_stamp()));
        self.separator();
    }

    pub fn session_ended(&self) {
        self.separator();
        self.line(&format!("Classification session ended: {}", now_stamp()));
        self.separator();
    }

    pub fn line(&self, message: &str) {
        use std::io::Write;
        let entry = format!("[{}] {message}\n", now_stamp());
        let result = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(entry.as_bytes()));
        if let Err(e) = result {
            eprintln!("Warning: failed to write to {}: {e}", self.path.display());
        }
    }

    fn separator(&self) {
        self.line(&"=".repeat(60));
    }
}

fn now_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Impresso antes de cada item na execução interativa.
pub fn item_header(index: usize, total: usize, id: &str) {
    let bold = Style::new().bold();
    println!();
    println!(
        "{}",
        bold.apply_to(format!("━━━ [{index}/{total}] Processing {id} ━━━"))
    );
}

pub fn item_saved(status: &SaveStatus) {
    let dim = Style::new().dim();
    match status {
        SaveStatus::Saved => {}
        SaveStatus::SavedToRecovery(path) => {
            println!("{}", dim.apply_to(format!("  (recovery log: {})", path.display())));
        }
        SaveStatus::SavedToEmergency(path) => {
            println!("{}", dim.apply_to(format!("  (emergency file: {})", path.display())));
        }
        SaveStatus::SaveFailed => {
            println!("{}", dim.apply_to("  (record lost; see warnings above)"));
        }
    }
}

pub fn item_skipped(id: &str) {
    let yellow = Style::new().yellow();
    println!("  {} Skipped: {id}", yellow.apply_to("→"));
}

/// Impresso uma vez no início da sessão.
pub fn session_start(total: usize, pending: usize, alignment: bool) {
    let dim = Style::new().dim();
    println!("PriorityLens");
    println!(
        "{}",
        dim.apply_to(format!(
            "  {total} items in input, {pending} queued this session, alignment {}",
            if alignment { "on" } else { "off" }
        ))
    );
}

/// Impresso uma vez depois da fila esvaziar.
pub fn session_summary(processed: usize, skipped: usize) {
    let bold = Style::new().bold();
    println!();
    println!(
        "{}",
        bold.apply_to(format!(
            "Session complete: {processed} processed, {skipped} skipped"
        ))
    );
}

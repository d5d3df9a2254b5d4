//! Interface de linha de comando baseada em clap.
//!
//! Define a struct [`Cli`] com os subcomandos [`Command`]
//! (run, extract, normalize, analyze, status) e a flag global --verbose.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// PriorityLens: classifica feedback de produto e o tria contra a estratégia.
#[derive(Debug, Parser)]
#[command(name = "prioritylens", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Habilita saída verbosa.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classifica um arquivo de feedback, revisando cada item interativamente.
    Run {
        /// Arquivo JSON contendo os itens de feedback a processar.
        input: PathBuf,

        /// Arquivo JSONL de saída para registros concluídos.
        #[arg(long, default_value = "output.jsonl")]
        output: PathBuf,

        /// Log CSV de auditoria das decisões de revisão.
        #[arg(long, default_value = "decisions.csv")]
        decisions: PathBuf,

        /// Só classifica; pula alinhamento e derivação de prioridade.
        #[arg(long, default_value_t = false)]
        no_alignment: bool,

        /// Reenfileira itens pulados anteriormente em vez dos pendentes.
        #[arg(long, default_value_t = false)]
        review_skipped: bool,

        /// Arquivo de estratégia normalizado para alinhar. Passar isso torna
        /// uma estratégia ausente ou vazia um erro duro em vez de rebaixar
        /// para classificação pura.
        #[arg(long)]
        strategy: Option<PathBuf>,
    },

    /// Extrai itens de feedback de uma transcrição bruta de entrevista.
    Extract {
        /// Arquivo texto da transcrição.
        transcript: PathBuf,

        /// Arquivo JSON de saída para os itens extraídos.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Rótulo de origem carimbado em cada item extraído.
        #[arg(long, default_value = "interview")]
        source: String,
    },

    /// Normaliza o documento de estratégia para a forma estruturada usada
    /// pelo alinhamento.
    Normalize,

    /// Compute agreement metrics over the decision log.
    Analyze {
        /// CSV file containing classification decisions.
        #[arg(default_value = "decisions.csv")]
        csv_file: PathBuf,
    },

    /// Mostra contagens de progresso e suspensões pendentes.
    Status {
        /// Arquivo JSONL de saída da execução a inspecionar.
        #[arg(long, default_value = "output.jsonl")]
        output: PathBuf,
    },
}

mod analyze;
mod anthropic;
mod cli;
mod config;
mod decisions;
mod error;
mod extract;
mod matrix;
mod model;
mod normalize;
mod operator;
mod persist;
mod progress;
mod prompts;
mod review;
mod session;
mod stages;
mod strategy;
mod ui;
mod workflow;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::anthropic::AnthropicClient;
use crate::cli::{Cli, Command};
use crate::config::LensConfig;
use crate::error::LensError;
use crate::operator::CliOperator;
use crate::review::CliReviewer;
use crate::session::RunOptions;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Abortos do operador são uma parada deliberada, não um crash;
            // reporta sem a cadeia de erro.
            match e.downcast_ref::<LensError>() {
                Some(err) if err.is_abort() => eprintln!("{err}"),
                _ => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = LensConfig::load().context("loading prioritylens.toml")?;
    if cli.verbose {
        eprintln!(
            "models: classify={} align={} extract={} normalize={}",
            config.classification_model,
            config.alignment_model,
            config.extraction_model,
            config.normalization_model
        );
    }

    match cli.command {
        Command::Run {
            input,
            output,
            decisions,
            no_alignment,
            review_skipped,
            strategy,
        } => {
            let client = client(&config)?;
            let mut operator = CliOperator::default();
            let mut reviewer = CliReviewer;
            session::run(
                client,
                &config,
                &mut operator,
                &mut reviewer,
                RunOptions {
                    input,
                    output,
                    decisions,
                    no_alignment,
                    review_skipped,
                    strategy,
                },
            )
            .await?;
        }
        Command::Extract {
            transcript,
            output,
            source,
        } => {
            let client = client(&config)?;
            extract::run_extract(&client, &config.extraction_model, &transcript, output, &source)
                .await?;
        }
        Command::Normalize => {
            let client = client(&config)?;
            normalize::run_normalize(
                &client,
                &config.normalization_model,
                Path::new(&config.strategy_file),
                Path::new(&config.normalized_strategy_file),
            )
            .await?;
        }
        Command::Analyze { csv_file } => {
            analyze::run_analyze(&csv_file)?;
        }
        Command::Status { output } => {
            session::status(&output);
        }
    }
    Ok(())
}

fn client(config: &LensConfig) -> Result<AnthropicClient> {
    if config.api_key.is_empty() {
        bail!("no API key configured; set ANTHROPIC_API_KEY or api_key in prioritylens.toml");
    }
    Ok(AnthropicClient::new(config.api_key.clone())?)
}

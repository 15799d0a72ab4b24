//! InkEngine - nightly orchestrator
//!
//! CLI entry point: prepares one book repository for the generation step.

use std::process::ExitCode;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, error, info};

use inkengine::cli::{Cli, OutputFormat};
use inkengine::config::EngineConfig;
use inkengine::session::{Session, SessionReport};
use inkengine::git::SystemRunner;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    // stdout carries the report, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to install log subscriber: {}", e))?;

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_log_level = EngineConfig::load_log_level(cli.config.as_ref());
    if let Err(e) = setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()) {
        eprintln!("Failed to setup logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let books_root = cli.books_root.unwrap_or(config.books_root);
    info!("Books root: {}", books_root.display());

    let session = Session::new(SystemRunner, books_root);
    let report = session.run(&cli.repo_url)?;

    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize session report")?;
            println!("{}", json);
        }
        OutputFormat::Text => print_summary(&report),
    }
    Ok(())
}

fn print_summary(report: &SessionReport) {
    println!("{} Session prepared for {}", "✓".green(), report.book.cyan());
    println!("  Snapshot:  {}", report.snapshot_tag);
    println!("  Draft:     {:?}", report.draft_state);
    println!("  Edits:     {} file(s), {:?}", report.human_edits.len(), report.reconcile);
    println!("  Sections:  {}", report.payload.context_sections.len());
    let budget = &report.payload.word_budget;
    println!("  Words:     {} of {} ({} to go)", budget.total, budget.target, budget.remaining);
    if let Some(review) = &report.payload.review {
        println!("  Requests:  {}", review.instructions.len());
    }
    println!(
        "  Target:    {} words tonight",
        report.payload.config.nightly_output_target.to_string().yellow()
    );
}

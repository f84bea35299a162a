//! Ollama Query - interactive command line for an Ollama server.
//!
//! Main entry point for the `ollama-query` REPL.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use ollama_query_client::{DEFAULT_HOST, OllamaClient};
use ollama_query_config::{LoadedConfig, QueryConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;

use commands::repl::{Repl, ReplOptions};
use commands::{Session, Verbosity};

/// Command run before the first prompt when none is configured.
const DEFAULT_ACTION: &str = "help";

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Ollama Query - interactive command line for an Ollama server
#[derive(Parser)]
#[command(name = "ollama-query")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Server URL (default: http://localhost:11434)
    #[arg(long, env = "OLLAMA_HOST")]
    pub host: Option<String>,

    /// Commands to run before the first prompt, separated by `;`
    #[arg(long)]
    pub action: Option<String>,

    /// Increase output verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// History file (default: <config dir>/history)
    #[arg(long)]
    pub history_file: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = ollama_query_config::load_config(None);
    let config = &loaded.config;

    let verbosity = Verbosity::new(config.logging.verbosity().saturating_add(cli.verbose));
    let _guard = init_tracing(verbosity, config);
    report_config(&loaded);

    let host = cli
        .host
        .or_else(|| config.host.clone())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let client = OllamaClient::builder()
        .base_url(&host)
        .build()
        .with_context(|| format!("Invalid server URL: {}", host))?;
    tracing::info!(server = %client.base_url(), "Using Ollama server");

    println!("{}", style("Ollama Server Command Line").bold().underlined().blue());

    let options = ReplOptions {
        history_path: cli
            .history_file
            .or_else(|| config.history.effective_path(ollama_query_config::config_dir().as_deref())),
        max_history: config.history.max_entries(),
    };
    let initial = cli
        .action
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .or_else(|| config.initial_action().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_ACTION.to_string());

    let session = Session::new(client, verbosity);
    let mut repl = Repl::new(commands::registry(), session, options)
        .context("Failed to initialize the terminal")?;
    repl.run(Some(initial))
}

/// Console layer on stderr plus, unless disabled, a daily JSON log file.
///
/// The returned guard flushes the file writer when dropped.
fn init_tracing(verbosity: Verbosity, config: &QueryConfig) -> Option<WorkerGuard> {
    let console = tracing_subscriber::fmt::layer()
        .with_target(verbosity.level() > 1)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(verbosity.console_filter()));

    let appender = config
        .logging
        .file_enabled()
        .then(ollama_query_config::config_dir)
        .flatten()
        .map(|dir| dir.join("logs"))
        .and_then(|dir| {
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("ollama-query.log")
                .build(&dir)
                .ok()
        });

    match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new(
                    "ollama_query=trace,ollama_query_client=trace,ollama_query_config=trace,info",
                ));
            tracing_subscriber::registry().with(console).with(file).init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(console).init();
            None
        }
    }
}

fn report_config(loaded: &LoadedConfig) {
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }
    for path in loaded.loaded_from() {
        tracing::debug!(path = %path.display(), "Loaded config");
    }
}

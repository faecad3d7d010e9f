use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use flashcard_import::{parse_count, parse_export, ImportResult, ImporterConfig, Integration};

/// Extract flashcard terms from a set URL or a pasted export, printing JSON
#[derive(Parser)]
#[command(name = "flashcard-import", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a set page and extract its terms
    Url {
        url: String,
        /// Source site
        #[arg(long, default_value = "quizlet")]
        integration: Integration,
    },
    /// Parse a plain-text export file ("-" for stdin)
    Export {
        path: PathBuf,
        #[arg(long, default_value = "")]
        title: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let result = match cli.command {
        Command::Url { url, integration } => {
            let config = ImporterConfig::from_env()?;
            let importer = integration.importer(&config)?;

            let cancel = CancellationToken::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_ctrl_c.cancel();
                }
            });

            importer.import_from_url(&url, &cancel).await?
        }
        Command::Export { path, title } => {
            let text = if path.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin()).context("reading stdin")?
            } else {
                std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?
            };
            tracing::info!("{} parsable lines", parse_count(&text));
            ImportResult {
                title,
                terms: parse_export(&text),
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

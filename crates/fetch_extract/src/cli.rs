use clap::{Args, Subcommand};
use fetch_core::Result;
use serde::Serialize;
use tracing::info;

use crate::ingest::IngestManager;

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[command(subcommand)]
    pub command: IngestCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum IngestCommands {
    /// Fetch and extract a URL without storing it
    Extract {
        url: String,
        /// Source label recorded on the article
        #[arg(long)]
        source: Option<String>,
    },
    /// Fetch, extract and store a single URL
    Ingest {
        url: String,
        #[arg(long)]
        source: Option<String>,
    },
    /// Ingest several URLs; only the first ten are processed
    Batch {
        #[arg(required = true)]
        urls: Vec<String>,
        #[arg(long)]
        source: Option<String>,
    },
}

pub async fn handle_command(args: IngestArgs, manager: &IngestManager) -> Result<()> {
    match args.command {
        IngestCommands::Extract { url, source } => {
            let article = manager.extract(&url, source.as_deref()).await?;
            print_json(&article)?;
        }
        IngestCommands::Ingest { url, source } => {
            let outcome = manager.ingest(&url, source.as_deref()).await?;
            let emoji = if outcome.is_duplicate() { "⏭️" } else { "🆕" };
            info!("{} {} - {}", emoji, outcome.article.title, outcome.article.url);
            print_json(&outcome)?;
        }
        IngestCommands::Batch { urls, source } => {
            let batch = manager.run_batch(&urls, source.as_deref()).await?;
            for outcome in &batch.results {
                match (&outcome.error, outcome.is_duplicate) {
                    (Some(error), _) => eprintln!("❌ {} - {}", outcome.url, error),
                    (None, true) => info!("⏭️ {}", outcome.url),
                    (None, false) => info!("🆕 {}", outcome.url),
                }
            }
            print_json(&batch)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use fetch_core::IngestConfig;
use fetch_extract::{handle_command, init_logging, IngestArgs, IngestCommands, IngestManager};
use fetch_storage::{StoreConfig, StoreKind, DEFAULT_TABLE};
use fetch_web::AppState;
use tracing::{info, warn};

/// Durations such as `30s`, `2m` or `1m30s`. A bare number means seconds.
#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds += num;
            has_unit = true;
        }

        if !has_unit || total_seconds == 0 {
            return Err("Duration must be a positive number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch, extract and store web articles", long_about = None)]
struct Cli {
    #[arg(long, env = "FETCH_STORAGE", default_value = "memory")]
    storage: StoreKind,
    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    backend_url: Option<String>,
    /// Supabase service key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    backend_key: Option<String>,
    #[arg(long, env = "SUPABASE_TABLE", default_value = DEFAULT_TABLE)]
    table: String,
    /// Per-request fetch timeout (e.g. 30s, 1m)
    #[arg(long, default_value = "30s")]
    fetch_timeout: HumanDuration,
    /// How many batch URLs are in flight at once
    #[arg(long, default_value_t = 1)]
    concurrency: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "FETCH_BIND", default_value = "0.0.0.0:8000")]
        bind: String,
    },
    Extract {
        url: String,
        #[arg(long)]
        source: Option<String>,
    },
    Ingest {
        url: String,
        #[arg(long)]
        source: Option<String>,
    },
    Batch {
        #[arg(required = true)]
        urls: Vec<String>,
        #[arg(long)]
        source: Option<String>,
    },
}

impl Cli {
    fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            fetch_timeout_secs: self.fetch_timeout.0.as_secs(),
            ..IngestConfig::default()
        }
        .with_batch_concurrency(self.concurrency)
    }

    fn store_config(&self) -> StoreConfig {
        StoreConfig {
            kind: self.storage,
            url: self.backend_url.clone(),
            api_key: self.backend_key.clone(),
            table: self.table.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("info");
    let cli = Cli::parse();

    let store = cli.store_config();
    info!("💾 Using {} storage", store.kind);
    let manager = IngestManager::from_configs(cli.ingest_config(), Some(&store))?;
    if !manager.gateway().is_available() {
        warn!("⚠️ No article store, only extraction will work");
    }

    let command = match cli.command {
        Commands::Serve { bind } => {
            fetch_web::serve(AppState::new(manager), &bind).await?;
            return Ok(());
        }
        Commands::Extract { url, source } => IngestCommands::Extract { url, source },
        Commands::Ingest { url, source } => IngestCommands::Ingest { url, source },
        Commands::Batch { urls, source } => IngestCommands::Batch { urls, source },
    };

    handle_command(IngestArgs { command }, &manager).await?;
    Ok(())
}

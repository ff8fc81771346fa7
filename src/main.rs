use anyhow::Context;
use clap::{Parser, Subcommand};
use media_etl::category::CategoryMap;
use media_etl::config::{Config, Overrides};
use media_etl::constants;
use media_etl::db::SqliteDocumentStore;
use media_etl::error::EtlError;
use media_etl::logging;
use media_etl::orchestrator::Orchestrator;
use media_etl::storage::DocumentStore;
use media_etl::types::SourceKind;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "media_etl")]
#[command(about = "Trending videos and playlist tracks into a keyed document store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, transform and load every configured (source, query) pair once
    Run {
        /// Sources to run (comma-separated). Available: videos, tracks
        #[arg(long)]
        sources: Option<String>,
        /// Region codes for trending videos (comma-separated), e.g. BR,US
        #[arg(long)]
        regions: Option<String>,
        /// Playlist ids for tracks (comma-separated)
        #[arg(long)]
        playlists: Option<String>,
        /// Items per page, capped at 50
        #[arg(long)]
        max_results: Option<u32>,
        /// Pause between pairs in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Path to a TOML config file (defaults to ./config.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the shared video category table
    Categories,
}

const EXIT_PAIR_FAILED: u8 = 1;
const EXIT_CONFIG: u8 = 2;

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_sources(list: &str) -> Result<Vec<SourceKind>, EtlError> {
    split_list(list)
        .iter()
        .map(|name| {
            SourceKind::from_name(name).ok_or_else(|| {
                EtlError::Config(format!(
                    "unknown source '{}'; available: {}",
                    name,
                    constants::get_supported_sources().join(", ")
                ))
            })
        })
        .collect()
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    match cli.command {
        Commands::Categories => {
            let categories = CategoryMap::builtin()?;
            println!("Category table v{} ({} entries)", categories.version(), categories.len());
            for (code, label) in categories.iter() {
                println!("{:>4}  {}", code, label);
            }
            Ok(0)
        }
        Commands::Run {
            sources,
            regions,
            playlists,
            max_results,
            delay_ms,
            config,
        } => {
            let mut settings = Config::load(config.as_deref())?;
            settings.apply_overrides(Overrides {
                sources: sources.as_deref().map(parse_sources).transpose()?,
                regions: regions.as_deref().map(split_list),
                playlists: playlists.as_deref().map(split_list),
                max_results,
                delay_ms,
            });
            settings.validate()?;

            let store_uri = settings.store_uri.clone().unwrap_or_default();
            let store: Arc<dyn DocumentStore> = Arc::new(
                SqliteDocumentStore::open(&store_uri)
                    .with_context(|| format!("opening document store '{}'", store_uri))?,
            );
            let categories = Arc::new(CategoryMap::builtin()?);
            let orchestrator = Orchestrator::from_config(&settings, categories, store)?;

            println!("🚀 Running {} pairs...", orchestrator.pair_count());
            let summary = orchestrator.run().await;

            if summary.is_success() {
                println!(
                    "✅ Run complete: {} inserted, {} updated",
                    summary.total_inserted(),
                    summary.total_updated()
                );
                Ok(0)
            } else {
                println!("\n⚠️  Failed pairs:");
                for failure in summary.failures() {
                    println!("   - {}", failure.summary_line());
                }
                Ok(EXIT_PAIR_FAILED)
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            let is_config = e
                .downcast_ref::<EtlError>()
                .map_or(false, EtlError::is_config);
            error!("Run aborted: {:#}", e);
            eprintln!("❌ {:#}", e);
            if is_config {
                EXIT_CONFIG
            } else {
                EXIT_PAIR_FAILED
            }
        }
    };
    info!("Exiting with status {}", code);
    ExitCode::from(code)
}

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use newslens_common::Config;
use newslens_scout::intelligence;
use newslens_scout::scheduler;
use newslens_scout::scout::{Scout, ScoutSettings};
use newslens_scout::sources::SourceRegistry;
use newslens_scout::store::PgStore;
use newslens_scout::traits::HttpFetcher;

#[derive(Parser)]
#[command(name = "newslens-scout", about = "Cross-source news ingestion and comparison")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single analysis cycle and exit.
    RunOnce,
    /// Run a cycle now, then repeat on the configured interval.
    Serve,
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("newslens_scout=info".parse()?)
        .add_directive("newslens_common=info".parse()?);
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    info!("NewsLens scout starting...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "Refusing to start");
            return Err(e.into());
        }
    };
    config.log_redacted();

    let store = PgStore::connect(&config.database_url).await?;
    store.migrate().await?;

    let fetcher = HttpFetcher::new(&config.user_agent, config.http_timeout)?;
    let intelligence = intelligence::from_config(&config)?;
    info!(provider = intelligence.name(), "Intelligence provider ready");

    let scout = Scout::new(
        SourceRegistry::default_catalog(),
        Arc::new(fetcher),
        intelligence,
        Arc::new(store),
        ScoutSettings::from_config(&config),
    );

    match cli.command {
        Command::RunOnce => {
            scout.run_cycle().await;
        }
        Command::Serve => scheduler::run_forever(&scout, config.run_interval).await,
    }

    Ok(())
}

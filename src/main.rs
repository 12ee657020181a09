mod config;
mod db;
mod error;
mod fetch;
mod ingest;
mod notify;
mod parse;
mod pipeline;
mod rating;
mod roster;
mod session;
mod tournament;
mod types;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::db::Store;
use crate::error::Result;
use crate::pipeline::{Pipeline, RunMode};

#[derive(Parser, Debug)]
#[command(name = "saltmine")]
#[command(about = "Scrapes fight results into a local match database")]
struct Cli {
    /// Re-scrape the full historical tournament range instead of the most
    /// recent tournaments.
    #[arg(long)]
    full_rebuild: bool,

    /// Reset every fighter's rating to the configured baseline before
    /// scraping.
    #[arg(long)]
    reset_ratings: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg, cli).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config, cli: Cli) -> Result<()> {
    let store = Store::open(&cfg.db_path).await?;
    info!("Database ready at {}", cfg.db_path);

    if cli.reset_ratings {
        let reset = store.reset_ratings(cfg.rating_base).await?;
        info!(fighters = reset, base = cfg.rating_base, "ratings reset");
    }

    let client = session::log_in(&cfg).await?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current page");
            interrupt.cancel();
        }
    });

    let mode = if cli.full_rebuild {
        RunMode::FullRebuild
    } else {
        RunMode::Recent
    };

    let pipeline = Pipeline::new(cfg.clone(), client.clone(), &store);
    let summary = pipeline.run(mode, &cancel).await?;

    notify::announce_completion(&client, cfg.bot_relay_url.as_deref(), &summary).await;
    store.close().await;
    info!(%summary, "done");
    Ok(())
}

mod api;
mod cache;
mod config;
mod email;
mod llm;
mod models;
mod scheduler;
mod scraper;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api::AppState;
use crate::cache::CacheStore;
use crate::config::AppConfig;
use crate::email::HttpMailer;
use crate::llm::OllamaClient;
use crate::scheduler::Refresher;
use crate::scraper::WebSource;

#[derive(Parser)]
#[command(name = "eventpulse", about = "SF events + stock cache API", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API with the background refresh scheduler
    Serve,

    /// Run a single refresh cycle and exit (cron / smoke-test mode)
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "eventpulse=info,warn",
        1 => "eventpulse=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Serve => serve(config).await?,

        Command::Refresh => {
            let source = Arc::new(WebSource::new(&config.scraper)?);
            let cache = CacheStore::new();
            let outcome = Refresher::new(source, cache.clone()).run_cycle().await;

            println!(
                "stock: {}",
                if outcome.stock_refreshed { "refreshed" } else { "FAILED" }
            );
            println!(
                "events: {} ({} records)",
                if outcome.events_refreshed { "refreshed" } else { "FAILED" },
                cache.events().await.map(|c| c.events.len()).unwrap_or(0),
            );
        }
    }

    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    let cache = CacheStore::new();

    let source = Arc::new(WebSource::new(&config.scraper)?);
    let refresher = Refresher::new(source, cache.clone());

    let shutdown = CancellationToken::new();
    let scheduler = tokio::spawn(refresher.run(
        Duration::from_secs(config.schedule.refresh_interval_secs),
        shutdown.clone(),
    ));

    let state = AppState {
        cache,
        llm: Arc::new(OllamaClient::new(&config.llm)?),
        mailer: Arc::new(HttpMailer::new(&config.email)?),
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await
        .context("HTTP server error")?;

    // Stop the scheduler after the server drains; an in-flight cycle either
    // completes its atomic slot write or is abandoned, never half-applied.
    shutdown.cancel();
    scheduler.await.ok();
    info!("Shutdown complete");

    Ok(())
}

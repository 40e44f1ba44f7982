mod cli;

use baseidx_config::Config;
use baseidx_connector::http::JsonRpcConnector;
use baseidx_store::LedgerStore;
use baseidx_watchlist::Watchlist;
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("baseidx=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(error) = run().await {
        tracing::error!(%error, "baseidx exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let store = LedgerStore::connect(&config.db.dsn()).await?;

    match cli.command {
        Command::CreateSchema => {
            store.create_schema().await?;
            tracing::info!("schema created");
        }
        Command::Index => {
            let connector = JsonRpcConnector::new(
                config.base_api.base_url.clone(),
                config.base_api.base_debug_url.clone(),
            )?;
            let watchlist = Watchlist::new(config.addresses.iter());
            baseidx_ingest::run(&connector, &watchlist, &store, &config.blocks).await?;
            tracing::info!(blocks = config.blocks.len(), "ingestion pass complete");
        }
        Command::Serve => {
            let store = Arc::new(store);
            let router = baseidx_api::router(store);
            let addr = format!("0.0.0.0:{}", config.api_port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "serving HTTP API");
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}

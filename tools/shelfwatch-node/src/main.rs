//! Shelfwatch node.
//!
//! Tracks dairy products and their storage readings and serves freshness,
//! expiry estimates and alerts over HTTP. Uses PostgreSQL when
//! `--database-url` is given, otherwise keeps everything in memory.

use anyhow::Context;
use clap::Parser;
use shelfwatch_node::{AppState, Cli, MemoryStore, PgStore, Store};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let store = match &cli.database_url {
        Some(url) => {
            let pg = PgStore::connect(url, cli.pool_size)
                .await
                .context("connecting to PostgreSQL")?;
            info!(pool_size = cli.pool_size, "using PostgreSQL store");
            Store::Postgres(pg)
        }
        None => {
            warn!("no DATABASE_URL configured, products are kept in memory only");
            Store::Memory(MemoryStore::new())
        }
    };

    let app = shelfwatch_node::app(AppState::new(store), &cli)?;

    let addr = cli.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "shelfwatch node listening");

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}

//! swcache-host entry point.
//!
//! Boots the cache manager over the configured SQLite database and serves it
//! as an MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use swcache_core::{AppConfig, CacheDb};
use swcache_worker::{CacheManager, FetchClient, FetchConfig, ManagerConfig};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod host;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let cache_name = config.cache_name();
    tracing::info!(cache = %cache_name, origin = %config.origin, db = %config.db_path.display(), "starting swcache-host on stdio transport");

    let db = CacheDb::open(&config.db_path).await.context("opening cache database")?;
    let network = FetchClient::new(FetchConfig::from(&config)).context("building http client")?;
    let manager_config = ManagerConfig::from_app(&config).context("resolving origin")?;

    let manager = Arc::new(CacheManager::new(
        manager_config,
        Arc::new(db),
        Arc::new(network),
        Arc::new(host::StdioHost::default()),
    ));

    let handler = handler::SwcacheServer::new(manager.clone());
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    manager.wait_until_idle().await;
    tracing::info!("swcache-host stopped");

    Ok(())
}

//! Tournament listing and admin server.
//!
//! Connects the configured store backend, wraps it in the shared query
//! cache, and serves the pages and JSON API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Error};
use pico_args::Arguments;
use tourney::cache::QueryCache;
use tourney::store::{MemoryStore, PgStore, RestStore, StoreBackend, StoreConfig, TournamentStore};
use tourney::TournamentAdmin;
use tourney_server::{
    api, config::ServerConfig, demo, instrumented::InstrumentedStore, logging, metrics,
};

const HELP: &str = "\
Run the tournament listing and admin server

USAGE:
  tourney_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --store      BACKEND     rest, postgres or memory    [default: env STORE_BACKEND or rest]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --demo                   Seed the memory store with sample tournaments
  -h, --help               Print help information

ENVIRONMENT:
  STORE_URL                Hosted backend base URL (rest)
  STORE_API_KEY            Hosted backend API key (rest)
  STORE_TABLE              Collection name [default: tournaments]
  STORE_TIMEOUT_SECS       Per-call timeout [default: 5]
  REORDER_MODE             start-date or rank [default: start-date]
  CACHE_TTL_SECS           Re-fetch the list after this many seconds
  METRICS_BIND             Prometheus exporter address (e.g., 127.0.0.1:9090)
  (See .env.example for all configuration options)
";

/// Interval for publishing cache counters to the exporter
const CACHE_METRICS_INTERVAL: Duration = Duration::from_secs(15);

struct Args {
    bind: Option<SocketAddr>,
    store: Option<StoreBackend>,
    database_url: Option<String>,
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        store: pargs.opt_value_from_str("--store")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        demo: pargs.contains("--demo"),
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.store, args.database_url)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        tracing::info!("Prometheus metrics exposed at http://{}/metrics", addr);
    }

    let (store, backend) = connect_store(&config.store, args.demo).await?;
    let store: Arc<dyn TournamentStore> = Arc::new(InstrumentedStore::new(store, backend));
    tracing::info!(
        "Using {} store, table {:?}, reorder mode {:?}",
        backend,
        config.store.table,
        config.reorder_mode
    );

    let cache = Arc::new(QueryCache::with_stale_after(config.cache_ttl));
    let admin = Arc::new(TournamentAdmin::new(store, cache.clone(), config.reorder_mode));

    if config.metrics_bind.is_some() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CACHE_METRICS_INTERVAL);
            loop {
                interval.tick().await;
                metrics::cache_events(cache.stats());
            }
        });
    }

    let app = api::create_router(api::AppState { admin });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    tracing::info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down server...");

    Ok(())
}

/// Build the configured backend
async fn connect_store(
    config: &StoreConfig,
    demo: bool,
) -> Result<(Arc<dyn TournamentStore>, &'static str), Error> {
    if demo && config.backend != StoreBackend::Memory {
        tracing::warn!("--demo only seeds the memory store; ignoring it");
    }

    let store: (Arc<dyn TournamentStore>, &'static str) = match config.backend {
        StoreBackend::Rest => {
            let store = RestStore::new(
                &config.rest.url,
                &config.rest.api_key,
                &config.table,
                config.timeout(),
            )
            .context("Invalid REST store configuration")?;
            tracing::info!("REST store endpoint: {}", store.endpoint());
            (Arc::new(store), "rest")
        }
        StoreBackend::Postgres => {
            let store = PgStore::connect(&config.database, &config.table, config.timeout())
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connected successfully");
            (Arc::new(store), "postgres")
        }
        StoreBackend::Memory => {
            let store = if demo {
                MemoryStore::with_rows(demo::tournaments(chrono::Utc::now()))
            } else {
                MemoryStore::new()
            };
            tracing::warn!("Using the in-memory store; data is lost on exit");
            (Arc::new(store), "memory")
        }
    };

    Ok(store)
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
}

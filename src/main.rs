use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bookcat::auth::TokenConfig;
use bookcat::config::{AppConfig, StoreBackend};
use bookcat::database::{DatabaseManager, DocumentStore, MemoryStore, PgStore};
use bookcat::state::AppState;

/// Book catalog HTTP server
#[derive(Debug, Parser)]
#[command(name = "bookcat", version, about)]
struct Args {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT / BOOKCAT_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Document store backend: postgres or memory (overrides BOOKCAT_STORE)
    #[arg(long)]
    store: Option<StoreBackend>,

    /// Postgres connection URL (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET, etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = apply_args(AppConfig::from_env(), args);
    tracing::info!("Starting bookcat in {:?} mode with {:?} store", config.environment, config.database.backend);

    let store = open_store(&config).await?;
    let state = AppState::new(
        store,
        TokenConfig { secret: config.security.jwt_secret.clone() },
        config.security.bcrypt_cost,
    )
    .context("JWT_SECRET must be set to a non-empty value")?
    .with_cors(config.security.enable_cors);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, bookcat::app(state)).await.context("server error")?;
    Ok(())
}

fn apply_args(mut config: AppConfig, args: Args) -> AppConfig {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(store) = args.store {
        config.database.backend = store;
    }
    if let Some(url) = args.database_url {
        config.database.url = Some(url);
    }
    config
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to Postgres")?;
            DatabaseManager::ensure_schema(&pool).await.context("failed to prepare schema")?;
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

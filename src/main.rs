use std::sync::Arc;
use bloomlist::config::settings::{self, Settings};
use bloomlist::errors::AppError;
use bloomlist::handlers::AppState;
use bloomlist::server;
use bloomlist::services::bloom::{BloomFilterCore, SharedFilter};
use bloomlist::services::metrics;
use bloomlist::services::storage::{FileStorage, MemoryStorage, Storage};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "bloomlist=info".into()))
        .init();

    let settings = Arc::new(settings::load()?);
    info!("Loaded settings: {:?}", settings);
    metrics::init_metrics();

    let filter = Arc::new(build_filter(&settings).await?);
    let state = AppState::new(Arc::clone(&settings), Arc::clone(&filter));

    let listener = TcpListener::bind(settings.server.bind_address()).await?;
    server::serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    })
    .await;

    if settings.storage.enabled {
        if let Err(e) = filter.persist().await {
            error!("Final snapshot failed: {}", e);
        }
    }
    debug!("Final metrics:\n{}", metrics::render());
    info!("Stopped with {} blacklisted items", filter.len());
    Ok(())
}

async fn build_filter(settings: &Settings) -> Result<SharedFilter, AppError> {
    let core = BloomFilterCore::new(settings.filter.bit_count, settings.filter.hash_functions()?)?;
    let storage: Arc<dyn Storage> = if settings.storage.enabled {
        Arc::new(FileStorage::from_config(&settings.storage))
    } else {
        Arc::new(MemoryStorage::new())
    };

    let filter = SharedFilter::new(core, storage);
    match filter.restore().await {
        Ok(true) => {}
        Ok(false) => info!("No filter record found; starting empty"),
        Err(AppError::MalformedRecord(reason)) if settings.storage.discard_malformed => {
            warn!("Discarding malformed filter record: {}", reason);
        }
        Err(e) => return Err(e),
    }
    Ok(filter)
}

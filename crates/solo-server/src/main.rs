use anyhow::Context;
use solo_server::{router, AppState, ServerConfig};
use solo_storage::{DocumentStore, InMemoryStore, PersistentStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env().context("reading configuration")?;
    let store: Arc<dyn DocumentStore> = match &config.data_dir {
        Some(dir) => match PersistentStore::open(dir.clone()) {
            Ok(p) => Arc::new(p),
            Err(e) => {
                warn!("persistent open failed: {}, falling back to memory", e);
                Arc::new(InMemoryStore::new())
            }
        },
        None => Arc::new(InMemoryStore::new()),
    };

    let addr = config.listen_addr;
    info!(
        server = %config.server(),
        webapp = %config.webapp_dir.display(),
        "starting solo"
    );
    let app = router(AppState::new(config, store));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("http listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

//! stocklink-watch - headless dashboard watcher.
//!
//! Wires the real adapters together: connects to the inventory service's
//! push channel, keeps the items and transactions views in sync, and
//! logs every event and connection-state change until interrupted.

use std::sync::Arc;

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

use stocklink::adapters::http::RestInventoryApi;
use stocklink::adapters::ws::WsTransport;
use stocklink::config::AppConfig;
use stocklink::domain::PushEvent;
use stocklink::ports::{EventHandler, InventoryApi};
use stocklink::sync::{ConnectionManager, SubscriberRegistry};
use stocklink::views::{ItemsView, TransactionsView};
use stocklink::SyncError;

/// Logs every event that comes over the push channel.
struct EventLogger;

#[async_trait]
impl EventHandler for EventLogger {
    async fn handle(&self, event: PushEvent) -> Result<(), SyncError> {
        tracing::info!(kind = ?event.kind, data = %event.data, "push event");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "EventLogger"
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate().map_err(stocklink::config::ConfigError::from)?;

    let api: Arc<dyn InventoryApi> = Arc::new(RestInventoryApi::new(&config.api)?);
    let registry = Arc::new(SubscriberRegistry::new());

    let items = ItemsView::new(Arc::clone(&api));
    items.register(&registry);
    let transactions = TransactionsView::new(Arc::clone(&api));
    transactions.register(&registry);
    registry.subscribe(Arc::new(EventLogger));

    // The service may come up after us; the reconnect loop covers both.
    if let Err(err) = items.load().await {
        tracing::warn!(error = %err, "initial item load failed");
    }
    if let Err(err) = transactions.load().await {
        tracing::warn!(error = %err, "initial transaction load failed");
    }
    tracing::info!(items = items.items().len(), "initial state loaded");

    let ws_url = config.push.ws_url(&config.api.base_url);
    let manager = ConnectionManager::new(
        Arc::new(WsTransport::new()),
        Arc::clone(&registry),
        ws_url.clone(),
        config.push.reconnect_delay(),
    );
    manager.ensure_connected();
    tracing::info!(url = %ws_url, "watching push channel");

    let mut state_rx = manager.watch_state();
    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = *state_rx.borrow();
            tracing::info!(%state, "connection state changed");
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    Ok(())
}

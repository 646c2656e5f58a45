//! Shopping list server - binary entry point

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shoplist::{create_router, AppState, Broadcaster, Config, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shoplist=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let store = Store::connect(&config.database_url).await?;
    store.init().await?;
    store.seed_sample_data().await?;

    let events = Broadcaster::new();
    let app = create_router(AppState::new(store, events.clone()));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "shoplist server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(events))
        .await?;

    info!("server stopped");
    Ok(())
}

/// Waits for Ctrl+C, then tells every connected event stream to
/// terminate. The terminal event must go out before graceful shutdown
/// starts draining: open SSE responses only finish once they receive
/// it, and `axum::serve` waits for them.
async fn shutdown_signal(events: Broadcaster) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
    }
    events.shutdown();
}

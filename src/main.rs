use anyhow::Context;
use dotenv::dotenv;
use tracing::info;

use consultbook_backend::{
    app::create_router,
    app_state::AppState,
    config,
    scheduling::sweep::spawn_completion_sweep,
    telemetry::{TelemetryConfig, init_telemetry},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = config::init().context("Failed to load configuration")?;
    let telemetry = init_telemetry(&TelemetryConfig::from_config(config))?;

    let state = AppState::from_config(config.clone())
        .await
        .context("Failed to initialize application state")?;

    if let Some(every) = config.scheduling.completion_sweep_interval {
        spawn_completion_sweep(state.scheduler.clone(), every);
    }

    let addr = config.server_addr();
    info!("{} listening on {} ({:?} storage)", config.app.name, addr, config.storage);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to serve application")?;

    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

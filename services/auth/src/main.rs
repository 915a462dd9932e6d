use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

use authenticator::{AppState, config::AppConfig, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    common::telemetry::init_tracing()?;

    info!("Starting authentication service");

    let config = AppConfig::from_env()?;
    let app_state = AppState::from_config(&config).await?;

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Authentication service listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

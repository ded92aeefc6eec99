//! Appliance remote bot - server binary

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use remobot_server::{
    create_app,
    external::ApplianceApiClient,
    services::{LineChatbotService, LineMessagingClient},
    AppState, Config,
};
use shared::ApplianceMenu;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remobot_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load().context("invalid configuration")?;

    tracing::info!("Starting Appliance Remote Bot");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Appliance API: {}", config.appliance_api.url);
    tracing::info!("Menu entries: {}", config.menu.len());

    // Create clients
    let line_client = LineMessagingClient::connect(&config.line)?;
    let appliance_client = Arc::new(ApplianceApiClient::from_config(&config.appliance_api));

    let chatbot = LineChatbotService::new(
        Arc::new(line_client),
        appliance_client.clone(),
        appliance_client,
        ApplianceMenu::new(config.menu.clone()),
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        chatbot: Arc::new(chatbot),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host: {}", config.server.host))?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

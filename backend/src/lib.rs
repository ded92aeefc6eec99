//! Appliance remote bot - backend
//!
//! Bridges LINE chat events to a home-automation HTTP API: menu labels are
//! answered with On/Off buttons and button presses become power commands.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use services::LineChatbotService;

/// Application state shared across handlers
///
/// Everything in here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chatbot: Arc<LineChatbotService>,
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Appliance Remote Bot v1.0"
}

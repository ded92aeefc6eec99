//! Route definitions for the appliance remote bot

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // LINE webhook (public - authenticated by x-line-signature)
        .route("/webhook/line", post(handlers::handle_line_webhook))
}

//! HTTP handlers

pub mod health;
pub mod line_chatbot;

pub use health::health_check;
pub use line_chatbot::handle_line_webhook;

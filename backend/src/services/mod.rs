//! Business logic services

pub mod line_chatbot;
pub mod line_messaging;

pub use line_chatbot::LineChatbotService;
pub use line_messaging::{LineMessagingClient, Messenger};

//! Shared types and models for the appliance remote bot
//!
//! This crate holds the I/O-free domain: appliance types, postback
//! payloads and the menu table.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::*;

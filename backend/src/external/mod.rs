//! External API integrations

pub mod appliance_api;

pub use appliance_api::{ApplianceApiClient, ApplianceControl, ApplianceDirectory};

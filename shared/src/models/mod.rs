//! Domain models for the appliance remote bot

mod appliance;
mod menu;
mod postback;

pub use appliance::*;
pub use menu::*;
pub use postback::*;

//! Appliance models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of appliance the bot knows how to switch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplianceType {
    Tv,
    Ac,
    Light,
}

/// Error returned when a type string does not name a known appliance type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown appliance type: {0}")]
pub struct UnknownApplianceType(pub String);

impl ApplianceType {
    /// All supported appliance types
    pub const ALL: [ApplianceType; 3] = [ApplianceType::Tv, ApplianceType::Ac, ApplianceType::Light];

    /// Wire code used by the appliance API and inside postback data
    pub fn code(&self) -> &'static str {
        match self {
            ApplianceType::Tv => "TV",
            ApplianceType::Ac => "AC",
            ApplianceType::Light => "LIGHT",
        }
    }

    /// Path segment of the control endpoint for this type
    pub fn api_path(&self) -> &'static str {
        match self {
            ApplianceType::Tv => "tv",
            ApplianceType::Ac => "aircon_settings",
            ApplianceType::Light => "light",
        }
    }
}

impl fmt::Display for ApplianceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ApplianceType {
    type Err = UnknownApplianceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TV" => Ok(ApplianceType::Tv),
            "AC" => Ok(ApplianceType::Ac),
            "LIGHT" => Ok(ApplianceType::Light),
            other => Err(UnknownApplianceType(other.to_string())),
        }
    }
}

/// An appliance registered with the remote API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Appliance {
    pub id: String,
    pub appliance_type: ApplianceType,
    pub nickname: String,
}

/// Select the first appliance of the given type, in list order.
///
/// When several appliances share a type only the first one is addressable.
pub fn find_by_type(appliances: &[Appliance], appliance_type: ApplianceType) -> Option<&Appliance> {
    appliances
        .iter()
        .find(|a| a.appliance_type == appliance_type)
}

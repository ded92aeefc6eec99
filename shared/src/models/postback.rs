//! Postback payload models
//!
//! Buttons in a select prompt carry `"<TYPE>,<on|off>"` as postback data,
//! for example `"LIGHT,on"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ApplianceType;

/// Requested power state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerState::On => "on",
            PowerState::Off => "off",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from decoding postback data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("postback data has no separator: {0:?}")]
    MissingSeparator(String),

    #[error("unknown appliance type in postback: {0:?}")]
    UnknownType(String),

    #[error("unknown power state in postback: {0:?}")]
    UnknownPowerState(String),
}

/// Decoded postback data
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PostbackPayload {
    pub appliance_type: ApplianceType,
    pub power: PowerState,
}

impl PostbackPayload {
    pub const SEPARATOR: char = ',';

    pub fn new(appliance_type: ApplianceType, power: PowerState) -> Self {
        Self {
            appliance_type,
            power,
        }
    }

    /// Encode as postback data
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.appliance_type.code(), Self::SEPARATOR, self.power)
    }
}

impl fmt::Display for PostbackPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for PostbackPayload {
    type Err = PayloadError;

    /// Split on the first separator; anything after it must be exactly
    /// `on` or `off`, so a second separator is rejected with the power token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (type_part, power_part) = s
            .split_once(Self::SEPARATOR)
            .ok_or_else(|| PayloadError::MissingSeparator(s.to_string()))?;

        let appliance_type = type_part
            .parse::<ApplianceType>()
            .map_err(|_| PayloadError::UnknownType(type_part.to_string()))?;

        let power = match power_part {
            "on" => PowerState::On,
            "off" => PowerState::Off,
            other => return Err(PayloadError::UnknownPowerState(other.to_string())),
        };

        Ok(Self::new(appliance_type, power))
    }
}

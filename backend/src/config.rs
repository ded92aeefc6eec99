//! Configuration management for the appliance remote bot
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with REMOBOT__ prefix
//! 4. The legacy variables LINE_BOT_CHANNEL_SECRET, LINE_BOT_CHANNEL_TOKEN,
//!    API_URL and API_TOKEN

use config::{ConfigError, Environment, File};
use reqwest::Url;
use serde::Deserialize;
use shared::{default_menu, validate_menu, validate_required, MenuEntry};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// LINE Messaging API configuration
    pub line: LineConfig,

    /// Appliance control API configuration
    pub appliance_api: ApplianceApiConfig,

    /// Label to appliance type table
    #[serde(default = "default_menu")]
    pub menu: Vec<MenuEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LineConfig {
    /// LINE Channel Secret, used for webhook signatures
    pub channel_secret: String,

    /// LINE Messaging API channel access token
    pub channel_access_token: String,

    /// LINE Messaging API base URL
    pub api_base_url: String,

    /// Reject webhooks whose x-line-signature does not match
    pub verify_signature: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplianceApiConfig {
    /// Base URL of the appliance API, without the version segment
    pub url: String,

    /// Bearer token for the appliance API
    pub token: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("REMOBOT_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("line.channel_secret", "")?
            .set_default("line.channel_access_token", "")?
            .set_default("line.api_base_url", "https://api.line.me")?
            .set_default("line.verify_signature", true)?
            .set_default("appliance_api.url", "")?
            .set_default("appliance_api.token", "")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (REMOBOT__ prefix)
            // Values stay strings so tokens like "00123" are kept verbatim
            .add_source(Environment::with_prefix("REMOBOT").separator("__"))
            // Legacy variable names
            .set_override_option("line.channel_secret", legacy_var("LINE_BOT_CHANNEL_SECRET"))?
            .set_override_option("line.channel_access_token", legacy_var("LINE_BOT_CHANNEL_TOKEN"))?
            .set_override_option("appliance_api.url", legacy_var("API_URL"))?
            .set_override_option("appliance_api.token", legacy_var("API_TOKEN"))?
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every required setting is present and well formed
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("line.channel_secret", &self.line.channel_secret),
            ("line.channel_access_token", &self.line.channel_access_token),
            ("appliance_api.url", &self.appliance_api.url),
            ("appliance_api.token", &self.appliance_api.token),
        ];
        for (key, value) in required {
            validate_required(value)
                .map_err(|e| ConfigError::Message(format!("{}: {}", key, e)))?;
        }

        let urls = [
            ("line.api_base_url", &self.line.api_base_url),
            ("appliance_api.url", &self.appliance_api.url),
        ];
        for (key, value) in urls {
            validate_base_url(value)
                .map_err(|e| ConfigError::Message(format!("{}: {}", key, e)))?;
        }

        validate_menu(&self.menu).map_err(|e| ConfigError::Message(format!("menu: {}", e)))?;

        Ok(())
    }
}

/// Accept only absolute http(s) URLs with a host
fn validate_base_url(value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("invalid URL: {}", e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme: {}", url.scheme()));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err("URL has no host".to_string()),
    }
}

fn legacy_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

//! Appliance API client
//!
//! Talks to a Nature Remo style cloud API:
//! - `GET  {base}/1/appliances` lists registered appliances
//! - `POST {base}/1/appliances/{id}/{path}` with `button=on|off` switches one

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use shared::{Appliance, ApplianceType, PowerState};

use crate::config::ApplianceApiConfig;
use crate::error::{AppError, AppResult};

/// Source of the appliance list
#[async_trait]
pub trait ApplianceDirectory: Send + Sync {
    async fn list_appliances(&self) -> AppResult<Vec<Appliance>>;
}

/// Sink for power commands
#[async_trait]
pub trait ApplianceControl: Send + Sync {
    async fn set_power(&self, appliance: &Appliance, power: PowerState) -> AppResult<()>;
}

/// Appliance API client
#[derive(Clone)]
pub struct ApplianceApiClient {
    client: Client,
    base_url: String,
    token: String,
}

/// Appliance entry as returned by the API
#[derive(Debug, Deserialize)]
struct ApiAppliance {
    #[serde(alias = "Id")]
    id: String,
    #[serde(rename = "type", alias = "Type")]
    appliance_type: String,
    #[serde(default, alias = "Nickname")]
    nickname: String,
}

impl ApplianceApiClient {
    /// Create a new ApplianceApiClient
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &ApplianceApiConfig) -> Self {
        Self::new(config.url.clone(), config.token.clone())
    }

    /// Append percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Internal(format!("invalid appliance API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("appliance API URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn control_url(&self, appliance: &Appliance) -> AppResult<Url> {
        self.endpoint(&[
            "1",
            "appliances",
            appliance.id.as_str(),
            appliance.appliance_type.api_path(),
        ])
    }

    /// Keep only appliances the bot can switch
    fn convert_appliances(&self, data: Vec<ApiAppliance>) -> Vec<Appliance> {
        data.into_iter()
            .filter_map(|raw| match raw.appliance_type.parse::<ApplianceType>() {
                Ok(appliance_type) => Some(Appliance {
                    id: raw.id,
                    appliance_type,
                    nickname: raw.nickname,
                }),
                Err(_) => {
                    tracing::debug!(
                        "Skipping appliance {} ({}) of unsupported type {}",
                        raw.id,
                        raw.nickname,
                        raw.appliance_type
                    );
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl ApplianceDirectory for ApplianceApiClient {
    async fn list_appliances(&self) -> AppResult<Vec<Appliance>> {
        let url = self.endpoint(&["1", "appliances"])?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Appliance list request failed with http status code: {}", status.as_u16());
            return Err(AppError::RemoteApi {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        let data: Vec<ApiAppliance> =
            serde_json::from_slice(&body).map_err(|e| AppError::Decode(e.to_string()))?;

        let appliances = self.convert_appliances(data);
        tracing::debug!("Fetched {} controllable appliances", appliances.len());
        Ok(appliances)
    }
}

#[async_trait]
impl ApplianceControl for ApplianceApiClient {
    async fn set_power(&self, appliance: &Appliance, power: PowerState) -> AppResult<()> {
        if appliance.id.trim().is_empty() {
            return Err(AppError::Internal("appliance id is empty".to_string()));
        }

        let url = self.control_url(appliance)?;
        tracing::info!(
            "Switching {} {} ({})",
            appliance.appliance_type,
            power,
            appliance.nickname
        );

        let response = self
            .client
            .post(url.as_str())
            .bearer_auth(&self.token)
            .form(&[("button", power.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Control request to {} failed with http status code: {}", url, status.as_u16());
            return Err(AppError::RemoteApi {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appliance(id: &str, appliance_type: ApplianceType) -> Appliance {
        Appliance {
            id: id.to_string(),
            appliance_type,
            nickname: "living room".to_string(),
        }
    }

    #[test]
    fn test_control_url_per_type() {
        let client = ApplianceApiClient::new("https://api.nature.global/", "token");
        assert_eq!(
            client.control_url(&appliance("a1", ApplianceType::Ac)).unwrap().as_str(),
            "https://api.nature.global/1/appliances/a1/aircon_settings"
        );
        assert_eq!(
            client.control_url(&appliance("t1", ApplianceType::Tv)).unwrap().as_str(),
            "https://api.nature.global/1/appliances/t1/tv"
        );
        assert_eq!(
            client.control_url(&appliance("l1", ApplianceType::Light)).unwrap().as_str(),
            "https://api.nature.global/1/appliances/l1/light"
        );
    }

    #[test]
    fn test_control_url_escapes_appliance_id() {
        let client = ApplianceApiClient::new("https://api.nature.global", "token");
        assert_eq!(
            client.control_url(&appliance("a/b?c", ApplianceType::Light)).unwrap().as_str(),
            "https://api.nature.global/1/appliances/a%2Fb%3Fc/light"
        );
        assert_eq!(
            client.control_url(&appliance("../x", ApplianceType::Tv)).unwrap().as_str(),
            "https://api.nature.global/1/appliances/..%2Fx/tv"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = ApplianceApiClient::new("http://127.0.0.1:8080/remo/", "token");
        assert_eq!(
            client.endpoint(&["1", "appliances"]).unwrap().as_str(),
            "http://127.0.0.1:8080/remo/1/appliances"
        );
    }

    #[test]
    fn test_endpoint_rejects_unparsable_base() {
        let client = ApplianceApiClient::new("not a url", "token");
        assert!(matches!(
            client.endpoint(&["1", "appliances"]),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_decode_accepts_both_field_casings() {
        let body = r#"[
            {"Id": "a1", "Type": "AC", "Nickname": "Aircon"},
            {"id": "l1", "type": "LIGHT", "nickname": "Ceiling", "image": "ico_light"}
        ]"#;
        let data: Vec<ApiAppliance> = serde_json::from_str(body).unwrap();
        let client = ApplianceApiClient::new("https://api.nature.global", "token");
        let appliances = client.convert_appliances(data);

        assert_eq!(appliances.len(), 2);
        assert_eq!(appliances[0].id, "a1");
        assert_eq!(appliances[0].appliance_type, ApplianceType::Ac);
        assert_eq!(appliances[1].nickname, "Ceiling");
    }

    #[test]
    fn test_unsupported_types_are_dropped_in_order() {
        let body = r#"[
            {"id": "ir1", "type": "IR", "nickname": "Fan"},
            {"id": "l1", "type": "LIGHT", "nickname": "Ceiling"},
            {"id": "l2", "type": "LIGHT", "nickname": "Desk"}
        ]"#;
        let data: Vec<ApiAppliance> = serde_json::from_str(body).unwrap();
        let client = ApplianceApiClient::new("https://api.nature.global", "token");
        let ids: Vec<String> = client
            .convert_appliances(data)
            .into_iter()
            .map(|a| a.id)
            .collect();

        assert_eq!(ids, vec!["l1", "l2"]);
    }
}

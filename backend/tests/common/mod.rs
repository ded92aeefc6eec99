//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use remobot_server::{
    config::{ApplianceApiConfig, LineConfig, ServerConfig},
    create_app,
    error::{AppError, AppResult},
    external::{ApplianceControl, ApplianceDirectory},
    services::line_messaging::{compute_signature, LineMessage, LineTemplate, TemplateAction},
    services::{LineChatbotService, Messenger},
    AppState, Config,
};
use shared::{default_menu, Appliance, ApplianceMenu, ApplianceType, PowerState};
use tower::ServiceExt;

pub const CHANNEL_SECRET: &str = "test-channel-secret";

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
pub struct FakeMessenger {
    pub replies: Mutex<Vec<(String, Vec<LineMessage>)>>,
    pub fail: bool,
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn reply(&self, reply_token: &str, messages: Vec<LineMessage>) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Delivery("Invalid reply token".to_string()));
        }
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), messages));
        Ok(())
    }
}

pub struct FakeDirectory {
    pub result: Result<Vec<Appliance>, u16>,
    pub calls: Mutex<usize>,
}

#[async_trait]
impl ApplianceDirectory for FakeDirectory {
    async fn list_appliances(&self) -> AppResult<Vec<Appliance>> {
        *self.calls.lock().unwrap() += 1;
        self.result
            .clone()
            .map_err(|status| AppError::RemoteApi { status })
    }
}

#[derive(Default)]
pub struct FakeControl {
    pub calls: Mutex<Vec<(String, ApplianceType, PowerState)>>,
    pub fail_status: Option<u16>,
}

#[async_trait]
impl ApplianceControl for FakeControl {
    async fn set_power(&self, appliance: &Appliance, power: PowerState) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((appliance.id.clone(), appliance.appliance_type, power));
        match self.fail_status {
            Some(status) => Err(AppError::RemoteApi { status }),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn appliance(id: &str, appliance_type: ApplianceType) -> Appliance {
    Appliance {
        id: id.to_string(),
        appliance_type,
        nickname: id.to_string(),
    }
}

/// Two lights, so "first match" is observable
pub fn home() -> Vec<Appliance> {
    vec![
        appliance("tv-1", ApplianceType::Tv),
        appliance("ac-1", ApplianceType::Ac),
        appliance("light-1", ApplianceType::Light),
        appliance("light-2", ApplianceType::Light),
        appliance("ac-2", ApplianceType::Ac),
    ]
}

pub fn test_config(appliance_api_url: &str, line_api_url: &str) -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        line: LineConfig {
            channel_secret: CHANNEL_SECRET.to_string(),
            channel_access_token: "test-access-token".to_string(),
            api_base_url: line_api_url.to_string(),
            verify_signature: true,
        },
        appliance_api: ApplianceApiConfig {
            url: appliance_api_url.to_string(),
            token: "test-api-token".to_string(),
        },
        menu: default_menu(),
    }
}

pub struct TestApp {
    pub app: Router,
    pub messenger: Arc<FakeMessenger>,
    pub directory: Arc<FakeDirectory>,
    pub control: Arc<FakeControl>,
}

pub fn test_app_with(
    messenger: FakeMessenger,
    directory_result: Result<Vec<Appliance>, u16>,
    control: FakeControl,
    config: Config,
) -> TestApp {
    let messenger = Arc::new(messenger);
    let directory = Arc::new(FakeDirectory {
        result: directory_result,
        calls: Mutex::new(0),
    });
    let control = Arc::new(control);

    let chatbot = LineChatbotService::new(
        messenger.clone(),
        directory.clone(),
        control.clone(),
        ApplianceMenu::new(config.menu.clone()),
    );
    let state = AppState {
        config: Arc::new(config),
        chatbot: Arc::new(chatbot),
    };

    TestApp {
        app: create_app(state),
        messenger,
        directory,
        control,
    }
}

pub fn test_app() -> TestApp {
    test_app_with(
        FakeMessenger::default(),
        Ok(home()),
        FakeControl::default(),
        test_config("https://api.nature.global", "https://api.line.me"),
    )
}

// ============================================================================
// Webhook Bodies
// ============================================================================

pub fn text_event(text: &str, reply_token: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "message",
        "mode": "active",
        "timestamp": 1700000000000_i64,
        "replyToken": reply_token,
        "source": { "type": "user", "userId": "U0123456789abcdef" },
        "message": { "type": "text", "id": "468789577898262530", "text": text }
    })
}

pub fn postback_event(data: &str, reply_token: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "postback",
        "mode": "active",
        "timestamp": 1700000000000_i64,
        "replyToken": reply_token,
        "source": { "type": "user", "userId": "U0123456789abcdef" },
        "postback": { "data": data }
    })
}

pub fn webhook_body(events: Vec<serde_json::Value>) -> String {
    serde_json::json!({
        "destination": "Uxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx",
        "events": events
    })
    .to_string()
}

/// POST a signed webhook body and return status and parsed JSON body
pub async fn post_webhook(app: &Router, body: String) -> (StatusCode, serde_json::Value) {
    let signature = compute_signature(CHANNEL_SECRET, body.as_bytes()).unwrap();
    send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/webhook/line")
            .header("content-type", "application/json")
            .header("x-line-signature", signature)
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Postback data of every action in a buttons template
pub fn postback_data(message: &LineMessage) -> Vec<String> {
    match message {
        LineMessage::Template {
            template: LineTemplate::Buttons { actions, .. },
            ..
        } => actions
            .iter()
            .map(|TemplateAction::Postback { data, .. }| data.clone())
            .collect(),
        other => panic!("expected buttons template, got {:?}", other),
    }
}

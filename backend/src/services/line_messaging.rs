//! LINE Messaging API adapter
//!
//! Covers the three things the bot needs from LINE:
//! - webhook body parsing and signature verification
//! - buttons template construction
//! - the reply endpoint

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use shared::{validate_action_count, validate_action_label, validate_postback_data, validate_prompt_text};

use crate::config::LineConfig;
use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook body signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

// ============================================================================
// Webhook Types
// ============================================================================

/// LINE Webhook request body
/// See: https://developers.line.biz/en/reference/messaging-api/#webhook-event-objects
#[derive(Debug, Deserialize)]
pub struct LineWebhookRequest {
    /// User ID of the LINE Official Account that received the webhook event
    #[serde(default)]
    pub destination: Option<String>,
    /// Array of webhook event objects
    pub events: Vec<LineWebhookEvent>,
}

/// LINE Webhook event
/// See: https://developers.line.biz/en/reference/messaging-api/#common-properties
#[derive(Debug, Deserialize)]
pub struct LineWebhookEvent {
    /// Event type
    #[serde(rename = "type")]
    pub event_type: String,
    /// Token for replying to this event (only for events that can be replied to)
    #[serde(rename = "replyToken")]
    pub reply_token: Option<String>,
    /// Message object (only for message events)
    pub message: Option<LineEventMessage>,
    /// Postback object (only for postback events)
    pub postback: Option<LineEventPostback>,
    /// Channel state: "active" or "standby"
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Webhook event ID
    #[serde(rename = "webhookEventId")]
    pub webhook_event_id: Option<String>,
    /// Delivery context for redelivery handling
    #[serde(rename = "deliveryContext")]
    pub delivery_context: Option<DeliveryContext>,
}

fn default_mode() -> String {
    "active".to_string()
}

/// Delivery context for webhook events
#[derive(Debug, Deserialize)]
pub struct DeliveryContext {
    /// Whether this is a redelivered event
    #[serde(rename = "isRedelivery")]
    pub is_redelivery: bool,
}

/// LINE event message
#[derive(Debug, Deserialize)]
pub struct LineEventMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: Option<String>,
}

/// LINE postback content
#[derive(Debug, Deserialize)]
pub struct LineEventPostback {
    pub data: String,
}

/// An event the bot can act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A text message sent by the user
    TextMessage { text: String, reply_token: String },
    /// A button press carrying the data chosen when the button was built
    Postback { data: String, reply_token: String },
    /// Event delivered while the channel is in standby for this bot
    Standby { event_type: String },
    /// Any other event (follow, sticker message, unsend, ...)
    Unsupported { event_type: String },
}

impl InboundEvent {
    /// Short name used in logs
    pub fn kind(&self) -> &str {
        match self {
            InboundEvent::TextMessage { .. } => "text",
            InboundEvent::Postback { .. } => "postback",
            InboundEvent::Standby { event_type } | InboundEvent::Unsupported { event_type } => {
                event_type.as_str()
            }
        }
    }
}

impl TryFrom<LineWebhookEvent> for InboundEvent {
    type Error = AppError;

    fn try_from(event: LineWebhookEvent) -> Result<Self, Self::Error> {
        if event.mode == "standby" {
            return Ok(InboundEvent::Standby {
                event_type: event.event_type,
            });
        }

        match event.event_type.as_str() {
            "message" => {
                let message = event.message.ok_or_else(|| {
                    AppError::MalformedPayload("message event without message".to_string())
                })?;
                if message.message_type != "text" {
                    return Ok(InboundEvent::Unsupported {
                        event_type: format!("message/{}", message.message_type),
                    });
                }
                let text = message.text.ok_or_else(|| {
                    AppError::MalformedPayload("text message without text".to_string())
                })?;
                let reply_token = event.reply_token.ok_or_else(|| {
                    AppError::MalformedPayload("text message without replyToken".to_string())
                })?;
                Ok(InboundEvent::TextMessage { text, reply_token })
            }
            "postback" => {
                let postback = event.postback.ok_or_else(|| {
                    AppError::MalformedPayload("postback event without postback".to_string())
                })?;
                let reply_token = event.reply_token.ok_or_else(|| {
                    AppError::MalformedPayload("postback event without replyToken".to_string())
                })?;
                Ok(InboundEvent::Postback {
                    data: postback.data,
                    reply_token,
                })
            }
            other => Ok(InboundEvent::Unsupported {
                event_type: other.to_string(),
            }),
        }
    }
}

/// Parse a raw webhook body into events, keeping delivery order
pub fn parse_events(body: &[u8]) -> AppResult<Vec<InboundEvent>> {
    let request: LineWebhookRequest = serde_json::from_slice(body)?;

    tracing::debug!(
        "Parsing {} webhook events for destination: {:?}",
        request.events.len(),
        request.destination
    );

    request
        .events
        .into_iter()
        .map(|event| {
            if let Some(ref ctx) = event.delivery_context {
                if ctx.is_redelivery {
                    tracing::info!("Received redelivered event: {:?}", event.webhook_event_id);
                }
            }
            InboundEvent::try_from(event)
        })
        .collect()
}

// ============================================================================
// Signature Verification
// ============================================================================

fn body_mac(channel_secret: &str, body: &[u8]) -> AppResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|_| AppError::Internal("Failed to create HMAC".to_string()))?;
    mac.update(body);
    Ok(mac)
}

/// Compute the base64 HMAC-SHA256 signature LINE sends for a body
pub fn compute_signature(channel_secret: &str, body: &[u8]) -> AppResult<String> {
    let mac = body_mac(channel_secret, body)?;
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Verify the x-line-signature header against the raw body
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: Option<&str>) -> AppResult<()> {
    let signature = signature.ok_or(AppError::InvalidSignature)?;
    let expected = BASE64
        .decode(signature.trim())
        .map_err(|_| AppError::InvalidSignature)?;

    body_mac(channel_secret, body)?
        .verify_slice(&expected)
        .map_err(|_| AppError::InvalidSignature)
}

// ============================================================================
// Reply Messages
// ============================================================================

/// LINE message types
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LineMessage {
    Text {
        text: String,
    },
    Template {
        #[serde(rename = "altText")]
        alt_text: String,
        template: LineTemplate,
    },
}

/// Template payloads
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LineTemplate {
    Buttons {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        text: String,
        actions: Vec<TemplateAction>,
    },
}

/// Template button actions
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateAction {
    Postback {
        label: String,
        data: String,
        #[serde(rename = "displayText")]
        display_text: String,
    },
}

/// One choice in a select prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectAction {
    pub label: String,
    pub display_text: String,
    pub postback_data: String,
}

impl SelectAction {
    pub fn new(
        label: impl Into<String>,
        display_text: impl Into<String>,
        postback_data: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            display_text: display_text.into(),
            postback_data: postback_data.into(),
        }
    }
}

/// Build a single-choice buttons template.
///
/// Every action keeps its own postback data; the prompt text doubles as the
/// notification alt text. Inputs outside the buttons template limits are
/// rejected here instead of by the reply endpoint.
pub fn build_select_prompt(prompt_text: &str, actions: &[SelectAction]) -> AppResult<LineMessage> {
    let invalid = |e: &str| AppError::InvalidTemplate(e.to_string());
    validate_prompt_text(prompt_text).map_err(invalid)?;
    validate_action_count(actions.len()).map_err(invalid)?;

    let mut template_actions = Vec::with_capacity(actions.len());
    for action in actions {
        validate_action_label(&action.label)
            .map_err(|e| AppError::InvalidTemplate(format!("{}: {:?}", e, action.label)))?;
        validate_postback_data(&action.postback_data)
            .map_err(|e| AppError::InvalidTemplate(format!("{} ({})", e, action.label)))?;
        template_actions.push(TemplateAction::Postback {
            label: action.label.clone(),
            data: action.postback_data.clone(),
            display_text: action.display_text.clone(),
        });
    }

    Ok(LineMessage::Template {
        alt_text: prompt_text.to_string(),
        template: LineTemplate::Buttons {
            title: None,
            text: prompt_text.to_string(),
            actions: template_actions,
        },
    })
}

/// Sends replies to the messaging platform
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Reply to the event identified by `reply_token`
    async fn reply(&self, reply_token: &str, messages: Vec<LineMessage>) -> AppResult<()>;
}

/// LINE reply message request
#[derive(Debug, Serialize)]
struct LineReplyRequest {
    #[serde(rename = "replyToken")]
    reply_token: String,
    messages: Vec<LineMessage>,
}

/// LINE Messaging API client
#[derive(Clone)]
pub struct LineMessagingClient {
    channel_access_token: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl LineMessagingClient {
    /// Create a client after checking both channel credentials are present
    pub fn connect(config: &LineConfig) -> AppResult<Self> {
        if config.channel_secret.trim().is_empty() {
            return Err(AppError::Configuration("LINE channel secret not set".to_string()));
        }
        if config.channel_access_token.trim().is_empty() {
            return Err(AppError::Configuration("LINE channel access token not set".to_string()));
        }

        Ok(Self {
            channel_access_token: config.channel_access_token.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl Messenger for LineMessagingClient {
    async fn reply(&self, reply_token: &str, messages: Vec<LineMessage>) -> AppResult<()> {
        let request = LineReplyRequest {
            reply_token: reply_token.to_string(),
            messages,
        };

        let response = self
            .http_client
            .post(format!("{}/v2/bot/message/reply", self.base_url))
            .bearer_auth(&self.channel_access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Delivery(format!("LINE reply error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("LINE reply rejected with status {}: {}", status, error_text);
            return Err(AppError::Delivery(format!(
                "LINE reply failed: {} {}",
                status, error_text
            )));
        }

        Ok(())
    }
}

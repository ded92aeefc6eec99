//! LINE Chatbot service for appliance power control
//!
//! Two-step exchange:
//! - A text message naming a menu category ("照明", "light", ...) is answered
//!   with an On/Off buttons template.
//! - Pressing a button sends back `"<TYPE>,<on|off>"` as postback data, which
//!   is turned into a power command for the first appliance of that type.

use std::sync::Arc;

use shared::{find_by_type, ApplianceMenu, ApplianceType, PostbackPayload, PowerState};

use crate::error::{AppError, AppResult};
use crate::external::{ApplianceControl, ApplianceDirectory};
use crate::services::line_messaging::{build_select_prompt, InboundEvent, Messenger, SelectAction};

/// LINE Chatbot service
#[derive(Clone)]
pub struct LineChatbotService {
    messenger: Arc<dyn Messenger>,
    directory: Arc<dyn ApplianceDirectory>,
    control: Arc<dyn ApplianceControl>,
    menu: Arc<ApplianceMenu>,
}

/// On/Off actions for a select prompt, each carrying its own postback data
pub fn power_actions(appliance_type: ApplianceType) -> Vec<SelectAction> {
    [(PowerState::On, "On"), (PowerState::Off, "Off")]
        .into_iter()
        .map(|(power, label)| {
            SelectAction::new(
                label,
                power.as_str(),
                PostbackPayload::new(appliance_type, power).encode(),
            )
        })
        .collect()
}

impl LineChatbotService {
    /// Create a new LineChatbotService instance
    pub fn new(
        messenger: Arc<dyn Messenger>,
        directory: Arc<dyn ApplianceDirectory>,
        control: Arc<dyn ApplianceControl>,
        menu: ApplianceMenu,
    ) -> Self {
        Self {
            messenger,
            directory,
            control,
            menu: Arc::new(menu),
        }
    }

    /// Process the events of one webhook delivery in order.
    ///
    /// The first failure aborts the rest of the batch. Replies already sent
    /// for earlier events are not retracted.
    pub async fn process_events(&self, events: Vec<InboundEvent>) -> AppResult<()> {
        for event in events {
            tracing::debug!("Dispatching {} event", event.kind());

            match event {
                InboundEvent::TextMessage { text, reply_token } => {
                    self.handle_text_message(&text, &reply_token).await?;
                }
                InboundEvent::Postback { data, .. } => {
                    self.handle_postback(&data).await?;
                }
                InboundEvent::Standby { event_type } => {
                    tracing::debug!("Skipping {} event in standby mode", event_type);
                }
                InboundEvent::Unsupported { event_type } => {
                    tracing::debug!("Ignoring unsupported event: {}", event_type);
                }
            }
        }
        Ok(())
    }

    /// Answer a menu label with an On/Off prompt; other text is ignored
    pub async fn handle_text_message(&self, text: &str, reply_token: &str) -> AppResult<()> {
        let Some(entry) = self.menu.lookup(text) else {
            tracing::debug!("No menu entry for text: {:?}", text);
            return Ok(());
        };

        let prompt = build_select_prompt(&entry.prompt, &power_actions(entry.appliance_type))?;
        self.messenger.reply(reply_token, vec![prompt]).await?;

        tracing::info!("Sent {} power prompt", entry.appliance_type);
        Ok(())
    }

    /// Decode a button press and switch the matching appliance
    pub async fn handle_postback(&self, data: &str) -> AppResult<()> {
        let payload: PostbackPayload = data.parse()?;

        let appliances = self.directory.list_appliances().await?;
        let appliance = find_by_type(&appliances, payload.appliance_type)
            .ok_or(AppError::ApplianceNotFound(payload.appliance_type))?;

        self.control.set_power(appliance, payload.power).await?;

        tracing::info!(
            "Switched {} ({}) {}",
            appliance.nickname,
            appliance.appliance_type,
            payload.power
        );
        Ok(())
    }
}

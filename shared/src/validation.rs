//! Validation utilities for the appliance remote bot
//!
//! Limits follow the LINE Messaging API buttons template.

use std::collections::HashSet;

use crate::models::MenuEntry;

/// Maximum length of buttons template text when no title is set
pub const MAX_PROMPT_CHARS: usize = 160;

/// Maximum length of a button action label
pub const MAX_ACTION_LABEL_CHARS: usize = 20;

/// Maximum number of actions in a buttons template
pub const MAX_TEMPLATE_ACTIONS: usize = 4;

/// Maximum length of postback data
pub const MAX_POSTBACK_DATA_CHARS: usize = 300;

// ============================================================================
// Menu Validations
// ============================================================================

/// Validate a prompt shown above the buttons
pub fn validate_prompt_text(prompt: &str) -> Result<(), &'static str> {
    if prompt.trim().is_empty() {
        return Err("Prompt text cannot be empty");
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err("Prompt text exceeds 160 characters");
    }
    Ok(())
}

/// Validate a button action label
pub fn validate_action_label(label: &str) -> Result<(), &'static str> {
    if label.trim().is_empty() {
        return Err("Action label cannot be empty");
    }
    if label.chars().count() > MAX_ACTION_LABEL_CHARS {
        return Err("Action label exceeds 20 characters");
    }
    Ok(())
}

/// Validate postback data carried by a button action
pub fn validate_postback_data(data: &str) -> Result<(), &'static str> {
    if data.is_empty() {
        return Err("Postback data cannot be empty");
    }
    if data.chars().count() > MAX_POSTBACK_DATA_CHARS {
        return Err("Postback data exceeds 300 characters");
    }
    Ok(())
}

/// Validate the number of actions in a buttons template
pub fn validate_action_count(count: usize) -> Result<(), &'static str> {
    if count == 0 {
        return Err("Template needs at least one action");
    }
    if count > MAX_TEMPLATE_ACTIONS {
        return Err("Template allows at most 4 actions");
    }
    Ok(())
}

/// Validate the whole menu table
///
/// Labels are compared after trimming, since incoming text is trimmed
/// before lookup.
pub fn validate_menu(entries: &[MenuEntry]) -> Result<(), String> {
    if entries.is_empty() {
        return Err("Menu must contain at least one entry".to_string());
    }

    let mut seen = HashSet::new();
    for entry in entries {
        let label = entry.label.trim();
        if label.is_empty() {
            return Err("Menu label cannot be empty".to_string());
        }
        if !seen.insert(label) {
            return Err(format!("Duplicate menu label: {}", label));
        }
        validate_prompt_text(&entry.prompt)
            .map_err(|e| format!("Menu entry '{}': {}", label, e))?;
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate that a required setting is present
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Value is required");
    }
    Ok(())
}

//! Menu models
//!
//! A menu entry maps a chat label to the appliance type it controls.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ApplianceType;

/// One row of the appliance menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuEntry {
    /// Text the user sends to open this menu
    pub label: String,
    /// Appliance type the prompt buttons control
    pub appliance_type: ApplianceType,
    /// Question shown above the on/off buttons
    pub prompt: String,
}

impl MenuEntry {
    pub fn new(label: impl Into<String>, appliance_type: ApplianceType, prompt: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            appliance_type,
            prompt: prompt.into(),
        }
    }
}

/// Menu used when none is configured
pub fn default_menu() -> Vec<MenuEntry> {
    vec![
        MenuEntry::new("エアコン", ApplianceType::Ac, "エアコンの電源を入れますか？"),
        MenuEntry::new("照明", ApplianceType::Light, "照明の電源を入れますか？"),
        MenuEntry::new("テレビ", ApplianceType::Tv, "テレビの電源を入れますか？"),
        MenuEntry::new("air conditioner", ApplianceType::Ac, "Turn the air conditioner on or off?"),
        MenuEntry::new("light", ApplianceType::Light, "Turn the light on or off?"),
        MenuEntry::new("television", ApplianceType::Tv, "Turn the television on or off?"),
    ]
}

/// Lookup table from chat text to menu entry
#[derive(Debug, Clone)]
pub struct ApplianceMenu {
    entries: HashMap<String, MenuEntry>,
}

impl ApplianceMenu {
    /// Build the table; on duplicate labels the first entry wins
    pub fn new(entries: impl IntoIterator<Item = MenuEntry>) -> Self {
        let mut map = HashMap::new();
        for entry in entries {
            map.entry(entry.label.trim().to_string()).or_insert(entry);
        }
        Self { entries: map }
    }

    /// Find the entry for a message, ignoring surrounding whitespace
    pub fn lookup(&self, text: &str) -> Option<&MenuEntry> {
        self.entries.get(text.trim())
    }
}

impl Default for ApplianceMenu {
    fn default() -> Self {
        Self::new(default_menu())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_menu_covers_every_type() {
        let menu = default_menu();
        for t in ApplianceType::ALL {
            assert!(menu.iter().any(|e| e.appliance_type == t));
        }
    }

    #[test]
    fn test_lookup_known_labels() {
        let menu = ApplianceMenu::default();
        assert_eq!(menu.lookup("エアコン").unwrap().appliance_type, ApplianceType::Ac);
        assert_eq!(menu.lookup("light").unwrap().appliance_type, ApplianceType::Light);
        assert_eq!(menu.lookup("  テレビ\n").unwrap().appliance_type, ApplianceType::Tv);
    }

    #[test]
    fn test_lookup_unknown_text() {
        let menu = ApplianceMenu::default();
        assert!(menu.lookup("hello").is_none());
        assert!(menu.lookup("").is_none());
        assert!(menu.lookup("Light").is_none());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let menu = ApplianceMenu::new(vec![
            MenuEntry::new("lamp", ApplianceType::Light, "Light?"),
            MenuEntry::new("lamp", ApplianceType::Tv, "TV?"),
        ]);
        assert_eq!(menu.lookup("lamp").unwrap().appliance_type, ApplianceType::Light);
    }

    #[test]
    fn test_menu_entry_deserializes_from_config() {
        let entry: MenuEntry = serde_json::from_str(
            r#"{"label":"fan","appliance_type":"AC","prompt":"Fan?"}"#,
        )
        .unwrap();
        assert_eq!(entry.appliance_type, ApplianceType::Ac);
    }
}

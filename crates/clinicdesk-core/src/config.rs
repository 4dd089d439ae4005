//! Front-desk settings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Phone line shown on the waiting-room screen when no settings file
/// overrides it.
pub const DEFAULT_EMERGENCY_PHONE: &str = "+998 (90) 304 - 04 - 44";

/// Static front-desk settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Emergency phone line shown on the waiting-room display
    #[serde(default = "default_emergency_phone")]
    pub emergency_phone: String,
}

fn default_emergency_phone() -> String {
    DEFAULT_EMERGENCY_PHONE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            emergency_phone: default_emergency_phone(),
        }
    }
}

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings file: {0}")]
    Json(#[from] serde_json::Error),
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_phone() {
        let settings = Settings::default();
        assert_eq!(settings.emergency_phone, DEFAULT_EMERGENCY_PHONE);
    }

    #[test]
    fn test_missing_field_falls_back() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.emergency_phone, DEFAULT_EMERGENCY_PHONE);
    }

    #[test]
    fn test_round_trip() {
        let settings: Settings =
            serde_json::from_str(r#"{"emergency_phone": "+1 555 0100"}"#).unwrap();
        assert_eq!(settings.emergency_phone, "+1 555 0100");
    }
}

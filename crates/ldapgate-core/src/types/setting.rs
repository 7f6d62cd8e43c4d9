//! Plugin setting values
//!
//! Settings are stored per tenant as text together with a type tag, the way
//! the host persists plugin settings. `SettingValue` is the typed view.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the per-tenant enablement flag. Under the global tenant it is
/// also the global-override flag.
pub const SETTING_ENABLED: &str = "enabled";

/// Type tag stored next to a setting value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingType {
    Bool,
    Int,
    String,
    Object,
}

impl SettingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingType::Bool => "bool",
            SettingType::Int => "int",
            SettingType::String => "string",
            SettingType::Object => "object",
        }
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => Ok(SettingType::Bool),
            "int" => Ok(SettingType::Int),
            "string" => Ok(SettingType::String),
            "object" => Ok(SettingType::Object),
            other => Err(crate::Error::UnknownSettingType(other.to_string())),
        }
    }
}

/// A typed setting value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    String(String),
    Object(serde_json::Value),
}

impl SettingValue {
    pub fn setting_type(&self) -> SettingType {
        match self {
            SettingValue::Bool(_) => SettingType::Bool,
            SettingValue::Int(_) => SettingType::Int,
            SettingValue::String(_) => SettingType::String,
            SettingValue::Object(_) => SettingType::Object,
        }
    }

    /// Read the value as a flag
    pub fn is_truthy(&self) -> bool {
        match self {
            SettingValue::Bool(b) => *b,
            SettingValue::Int(i) => *i != 0,
            SettingValue::String(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            ),
            SettingValue::Object(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text form written to the settings table
    pub fn to_stored(&self) -> String {
        match self {
            SettingValue::Bool(true) => "1".to_string(),
            SettingValue::Bool(false) => "0".to_string(),
            SettingValue::Int(i) => i.to_string(),
            SettingValue::String(s) => s.clone(),
            SettingValue::Object(v) => v.to_string(),
        }
    }

    /// Parse the text form read back from the settings table
    pub fn from_stored(name: &str, setting_type: SettingType, raw: &str) -> crate::Result<Self> {
        let malformed = || crate::Error::MalformedSetting {
            name: name.to_string(),
            setting_type: setting_type.to_string(),
            value: raw.to_string(),
        };

        match setting_type {
            SettingType::Bool => match raw.trim() {
                "1" | "true" => Ok(SettingValue::Bool(true)),
                "0" | "false" | "" => Ok(SettingValue::Bool(false)),
                _ => Err(malformed()),
            },
            SettingType::Int => raw
                .trim()
                .parse::<i64>()
                .map(SettingValue::Int)
                .map_err(|_| malformed()),
            SettingType::String => Ok(SettingValue::String(raw.to_string())),
            SettingType::Object => serde_json::from_str(raw)
                .map(SettingValue::Object)
                .map_err(|_| malformed()),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Bool(b)
    }
}

impl From<i64> for SettingValue {
    fn from(i: i64) -> Self {
        SettingValue::Int(i)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::String(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::String(s)
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{}", b),
            other => f.write_str(&other.to_stored()),
        }
    }
}

/// Validate a setting name before it reaches the store
pub fn validate_setting_name(name: &str) -> crate::Result<()> {
    if name.trim().is_empty() {
        return Err(crate::Error::InvalidSettingName(name.to_string()));
    }
    Ok(())
}

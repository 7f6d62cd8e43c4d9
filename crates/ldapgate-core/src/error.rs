//! Error types for Ldapgate

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Settings Errors
    #[error("Invalid setting name: {0}")]
    InvalidSettingName(String),

    #[error("Stored value for setting '{name}' is not a valid {setting_type}: {value}")]
    MalformedSetting {
        name: String,
        setting_type: String,
        value: String,
    },

    #[error("Unknown setting type: {0}")]
    UnknownSettingType(String),

    // Validation Errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Database Errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    // Internal Errors
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidSettingName(_) => "InvalidSettingName",
            Error::MalformedSetting { .. } => "MalformedSetting",
            Error::UnknownSettingType(_) => "UnknownSettingType",
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::ConfigError(_) => "ConfigError",
            Error::DatabaseError(_) => "DatabaseError",
            Error::InternalError(_) => "InternalError",
            Error::Io(_) => "InternalError",
            Error::Other(_) => "InternalError",
        }
    }

    /// Whether the failure came from the settings store rather than the caller
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Error::DatabaseError(_) | Error::MalformedSetting { .. } | Error::UnknownSettingType(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::DatabaseError("locked".into()).code(), "DatabaseError");
        assert_eq!(Error::InvalidSettingName(String::new()).code(), "InvalidSettingName");
        assert_eq!(
            Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "x")).code(),
            "InternalError"
        );
    }

    #[test]
    fn test_storage_failure_classification() {
        assert!(Error::DatabaseError("gone".into()).is_storage_failure());
        assert!(Error::MalformedSetting {
            name: "enabled".into(),
            setting_type: "bool".into(),
            value: "maybe".into(),
        }
        .is_storage_failure());
        assert!(!Error::InvalidArgument("x".into()).is_storage_failure());
    }
}

//! Ldapgate Core Library
//!
//! Core types, configuration and errors shared by the directory-authentication
//! gateway crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use types::{SettingType, SettingValue, TenantId};

/// Ldapgate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Plugin name under which settings are stored
pub const DEFAULT_PLUGIN_NAME: &str = "ldapauthplugin";

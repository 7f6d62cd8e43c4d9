//! Configuration for Ldapgate

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub ldap: LdapConnectionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("LDAPGATE_DATABASE_URL") {
            config.database.url = url;
        }
        if let Ok(timeout) = std::env::var("LDAPGATE_LDAP_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                config.ldap.timeout_seconds = t;
            }
        }
        if std::env::var("LDAPGATE_LDAP_SKIP_TLS_VERIFY")
            .map(|v| v == "true")
            .unwrap_or(false)
        {
            config.ldap.skip_tls_verify = true;
        }
        if let Ok(level) = std::env::var("LDAPGATE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("LDAPGATE_LOG_FORMAT") {
            config.logging.format = format;
        }

        config
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(crate::Error::ConfigError(
                "database.url must not be empty".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(crate::Error::ConfigError(
                "database.max_connections must be at least 1".into(),
            ));
        }
        self.ldap.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://ldapgate.db?mode=rwc".to_string(),
            max_connections: 10,
        }
    }
}

/// Directory connection settings shared by every tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConnectionConfig {
    /// Timeout applied to the transport connect and to the STARTTLS upgrade
    #[serde(default = "default_ldap_timeout")]
    pub timeout_seconds: u64,

    /// Skip TLS certificate verification (not recommended for production)
    #[serde(default)]
    pub skip_tls_verify: bool,

    /// Plugin name the settings are stored under
    #[serde(default = "default_plugin_name")]
    pub plugin_name: String,
}

fn default_ldap_timeout() -> u64 {
    10
}

fn default_plugin_name() -> String {
    crate::DEFAULT_PLUGIN_NAME.to_string()
}

impl Default for LdapConnectionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_ldap_timeout(),
            skip_tls_verify: false,
            plugin_name: default_plugin_name(),
        }
    }
}

impl LdapConnectionConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.timeout_seconds == 0 {
            return Err(crate::Error::ConfigError(
                "ldap.timeout_seconds must be greater than zero".into(),
            ));
        }
        if self.plugin_name.trim().is_empty() {
            return Err(crate::Error::ConfigError(
                "ldap.plugin_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ldap.timeout_seconds, 10);
        assert_eq!(config.ldap.plugin_name, "ldapauthplugin");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = GatewayConfig::from_toml(
            r#"
            [ldap]
            timeout_seconds = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.ldap.timeout_seconds, 3);
        assert!(!config.ldap.skip_tls_verify);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[database]\nurl = \"sqlite::memory:\"\nmax_connections = 1\n\n[logging]\nlevel = \"debug\"\nformat = \"json\""
        )
        .unwrap();

        let config = GatewayConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_config() {
        let mut config = GatewayConfig::default();
        config.ldap.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.database.url = String::new();
        assert!(config.validate().is_err());

        assert!(GatewayConfig::from_toml("[ldap]\ntimeout_seconds = \"soon\"").is_err());
    }
}

//! LDAP endpoint and connection error types

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;
use url::Url;

// ============================================================================
// Server Endpoint
// ============================================================================

/// Endpoints served over TLS from the first byte: an "ldaps" token followed
/// somewhere later by port 636.
static IMPLICIT_TLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ldaps.*636").expect("implicit TLS pattern is valid"));

/// Directory server address as configured by the tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    uri: String,
}

impl ServerEndpoint {
    /// Accepts any non-blank address string, the same way the directory
    /// client library does. Structure is not enforced and the address is
    /// kept exactly as given.
    pub fn parse(uri: &str) -> Result<Self, ConnectionError> {
        if uri.trim().is_empty() {
            return Err(ConnectionError::InvalidEndpoint(
                "Server URI is required".to_string(),
            ));
        }
        Ok(Self {
            uri: uri.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Whether the endpoint is already encrypted, so no STARTTLS is issued
    pub fn is_implicit_tls(&self) -> bool {
        IMPLICIT_TLS.is_match(&self.uri)
    }

    /// Host part, when the address parses as a URL
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.uri)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    /// Port, explicit or the scheme default (389 for ldap, 636 for ldaps)
    pub fn port(&self) -> Option<u16> {
        let url = Url::parse(&self.uri).ok()?;
        url.port().or(match url.scheme() {
            "ldap" => Some(389),
            "ldaps" => Some(636),
            _ => None,
        })
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failure reported by a directory client primitive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DirectoryOpError(pub String);

impl From<ldap3::LdapError> for DirectoryOpError {
    fn from(err: ldap3::LdapError) -> Self {
        DirectoryOpError(err.to_string())
    }
}

/// Why a connection to the directory server could not be established
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Directory server unreachable: {0}")]
    Unreachable(String),

    #[error("STARTTLS upgrade failed: {0}")]
    TlsUpgradeFailed(String),

    #[error("Directory session rejected {option}: {reason}")]
    OptionRejected { option: &'static str, reason: String },

    #[error("Invalid server endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ConnectionError {
    /// Stable identifier the authentication handler maps to a message
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectionError::Unreachable(_) => "unreachable",
            ConnectionError::TlsUpgradeFailed(_) => "tls_upgrade_failed",
            ConnectionError::OptionRejected { .. } => "option_rejected",
            ConnectionError::InvalidEndpoint(_) => "invalid_endpoint",
        }
    }
}

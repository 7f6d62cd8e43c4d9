//! LDAP client backed by ldap3
//!
//! Handles LDAP and LDAPS connections and the STARTTLS upgrade.

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings};
use ldapgate_core::config::LdapConnectionConfig;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::ldap::connection::{
    DirectoryClient, DirectorySession, ReleaseToken, LDAP_PROTOCOL_VERSION,
};
use crate::ldap::types::DirectoryOpError;

/// Opens ldap3 sessions with the configured timeout and TLS verification
#[derive(Debug, Clone)]
pub struct Ldap3Client {
    timeout: Duration,
    skip_tls_verify: bool,
}

impl Ldap3Client {
    pub fn new(timeout: Duration, skip_tls_verify: bool) -> Self {
        Self {
            timeout,
            skip_tls_verify,
        }
    }

    pub fn from_config(config: &LdapConnectionConfig) -> Self {
        Self::new(
            Duration::from_secs(config.timeout_seconds),
            config.skip_tls_verify,
        )
    }

    fn settings(&self, starttls: bool) -> LdapConnSettings {
        LdapConnSettings::new()
            .set_conn_timeout(self.timeout)
            .set_starttls(starttls)
            .set_no_tls_verify(self.skip_tls_verify)
    }
}

/// Create LDAP connection and spawn its driver
async fn create_connection(
    settings: LdapConnSettings,
    uri: &str,
) -> Result<Ldap, DirectoryOpError> {
    debug!("Connecting to LDAP server: {}", uri);

    let (conn, ldap) = LdapConnAsync::with_settings(settings, uri).await?;
    ldap3::drive!(conn);

    Ok(ldap)
}

#[async_trait]
impl DirectoryClient for Ldap3Client {
    type Session = Ldap3Session;

    async fn open(&self, uri: &str) -> Result<Ldap3Session, DirectoryOpError> {
        let ldap = create_connection(self.settings(false), uri).await?;

        Ok(Ldap3Session {
            client: self.clone(),
            uri: uri.to_string(),
            ldap: Some(ldap),
            upgraded: false,
        })
    }
}

/// Live ldap3 session
pub struct Ldap3Session {
    client: Ldap3Client,
    uri: String,
    ldap: Option<Ldap>,
    upgraded: bool,
}

impl Ldap3Session {
    /// Operation handle for bind and search; `None` once closed
    pub fn ldap(&mut self) -> Option<&mut Ldap> {
        self.ldap.as_mut()
    }

    pub fn is_upgraded(&self) -> bool {
        self.upgraded
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    fn is_ldaps(&self) -> bool {
        Url::parse(&self.uri)
            .map(|url| url.scheme() == "ldaps")
            .unwrap_or(false)
    }

    fn shutdown(&mut self) {
        let Some(mut ldap) = self.ldap.take() else {
            return;
        };

        // Unbind politely when a runtime is around; dropping the handle
        // alone also stops the connection driver.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let uri = self.uri.clone();
            runtime.spawn(async move {
                if let Err(e) = ldap.unbind().await {
                    debug!("Unbind from {} failed: {}", uri, e);
                }
            });
        }
    }
}

#[async_trait]
impl DirectorySession for Ldap3Session {
    // ldap3 speaks only LDAPv3
    fn set_protocol_version(&mut self, version: u8) -> Result<(), DirectoryOpError> {
        if version == LDAP_PROTOCOL_VERSION {
            Ok(())
        } else {
            Err(DirectoryOpError(format!(
                "protocol version {} is not supported",
                version
            )))
        }
    }

    // ldap3 returns referrals to the caller and never follows them
    fn set_referrals(&mut self, follow: bool) -> Result<(), DirectoryOpError> {
        if follow {
            Err(DirectoryOpError(
                "automatic referral chasing is not supported".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    // ldap3 negotiates STARTTLS only while connecting, so the session is
    // re-established with STARTTLS and the plaintext one is dropped.
    async fn start_tls(&mut self) -> Result<(), DirectoryOpError> {
        // ldap3 ignores the STARTTLS setting on ldaps URLs
        if self.is_ldaps() {
            return Err(DirectoryOpError(format!(
                "{} is already TLS from the first byte; STARTTLS does not apply",
                self.uri
            )));
        }

        let upgraded = create_connection(self.client.settings(true), &self.uri).await?;

        self.shutdown();
        self.ldap = Some(upgraded);
        self.upgraded = true;
        Ok(())
    }

    fn close(&mut self, _token: ReleaseToken) {
        self.shutdown();
    }
}

//! Directory connection establishment
//!
//! Opens a transport to the directory server, pins protocol version 3,
//! turns referral chasing off and, unless the endpoint is implicit TLS,
//! upgrades the transport with STARTTLS. The resulting handle is not yet
//! bound to any credentials.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::ldap::types::{ConnectionError, DirectoryOpError, ServerEndpoint};

/// Protocol version every session is pinned to
pub const LDAP_PROTOCOL_VERSION: u8 = 3;

/// Directory-protocol client capability: opens sessions by URI
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    type Session: DirectorySession;

    /// Open a transport-level connection to `uri`
    async fn open(&self, uri: &str) -> Result<Self::Session, DirectoryOpError>;
}

/// An open session to a directory server
#[async_trait]
pub trait DirectorySession: Send {
    fn set_protocol_version(&mut self, version: u8) -> Result<(), DirectoryOpError>;

    fn set_referrals(&mut self, follow: bool) -> Result<(), DirectoryOpError>;

    /// Upgrade the plaintext transport in place
    async fn start_tls(&mut self) -> Result<(), DirectoryOpError>;

    /// Release the transport. Called exactly once per session, by the
    /// owning [`ConnectionHandle`].
    fn close(&mut self, token: ReleaseToken);
}

/// Permission to close a session.
///
/// Only this crate can create one, so code holding a session through
/// [`ConnectionHandle::session_mut`] cannot close it behind the handle.
///
/// ```compile_fail
/// use ldapgate_auth::ldap::{ConnectionHandle, DirectorySession, Ldap3Session, ReleaseToken};
///
/// fn close_behind_handle(handle: &mut ConnectionHandle<Ldap3Session>) {
///     handle.session_mut().close(ReleaseToken(()));
/// }
/// ```
#[derive(Debug)]
pub struct ReleaseToken(());

impl ReleaseToken {
    pub(crate) fn new() -> Self {
        ReleaseToken(())
    }
}

/// How the transport of a handle is protected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSecurity {
    /// Encrypted from the first byte (ldaps on 636)
    ImplicitTls,
    /// Plaintext connection upgraded with STARTTLS
    StartTls,
}

/// Owned, single-use session to a directory server.
///
/// The transport is closed when the handle is released or dropped,
/// whichever comes first.
pub struct ConnectionHandle<S: DirectorySession> {
    session: S,
    endpoint: ServerEndpoint,
    security: TransportSecurity,
    released: bool,
}

impl<S: DirectorySession> ConnectionHandle<S> {
    fn new(session: S, endpoint: ServerEndpoint, security: TransportSecurity) -> Self {
        Self {
            session,
            endpoint,
            security,
            released: false,
        }
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    pub fn security(&self) -> TransportSecurity {
        self.security
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Session access for the bind performed by the authentication handler
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Close the transport now
    pub fn release(mut self) {
        self.close_once();
    }

    fn close_once(&mut self) {
        if !self.released {
            self.released = true;
            self.session.close(ReleaseToken::new());
        }
    }
}

impl<S: DirectorySession> Drop for ConnectionHandle<S> {
    fn drop(&mut self) {
        self.close_once();
    }
}

impl<S: DirectorySession> std::fmt::Debug for ConnectionHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("endpoint", &self.endpoint)
            .field("security", &self.security)
            .field("released", &self.released)
            .finish()
    }
}

/// Produces security-negotiated connection handles
pub struct ConnectionFactory<C: DirectoryClient> {
    client: C,
    timeout: Duration,
}

impl<C: DirectoryClient> ConnectionFactory<C> {
    /// `timeout` bounds the transport connect and the STARTTLS upgrade,
    /// each on its own.
    pub fn new(client: C, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Connect to `server_uri` and negotiate transport security
    pub async fn connect(
        &self,
        server_uri: &str,
    ) -> Result<ConnectionHandle<C::Session>, ConnectionError> {
        let endpoint = ServerEndpoint::parse(server_uri)?;

        // Step 1: transport
        let session = bounded(self.timeout, self.client.open(endpoint.as_str()))
            .await
            .map_err(ConnectionError::Unreachable)?;

        let security = if endpoint.is_implicit_tls() {
            TransportSecurity::ImplicitTls
        } else {
            TransportSecurity::StartTls
        };

        // Any early return below drops the handle and closes the transport
        let mut handle = ConnectionHandle::new(session, endpoint, security);

        // Step 2: protocol version
        handle
            .session
            .set_protocol_version(LDAP_PROTOCOL_VERSION)
            .map_err(|e| ConnectionError::OptionRejected {
                option: "protocol version 3",
                reason: e.to_string(),
            })?;

        // Step 3: referrals are surfaced, never chased
        handle
            .session
            .set_referrals(false)
            .map_err(|e| ConnectionError::OptionRejected {
                option: "referral chasing off",
                reason: e.to_string(),
            })?;

        // Step 4: upgrade unless already encrypted
        if security == TransportSecurity::StartTls {
            bounded(self.timeout, handle.session.start_tls())
                .await
                .map_err(ConnectionError::TlsUpgradeFailed)?;
        }

        Ok(handle)
    }
}

async fn bounded<T, F>(limit: Duration, step: F) -> Result<T, String>
where
    F: Future<Output = Result<T, DirectoryOpError>>,
{
    match tokio::time::timeout(limit, step).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {}s", limit.as_secs_f32())),
    }
}

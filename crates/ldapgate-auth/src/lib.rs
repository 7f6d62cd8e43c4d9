//! Directory authentication delegation for Ldapgate
//!
//! Decides which requests belong to directory-backed authentication and
//! opens security-negotiated connections to the directory server.

pub mod gate;
pub mod ldap;
pub mod plugin;

pub use gate::{DelegateHandler, InterceptDecision, RequestGate};
pub use ldap::{
    ConnectionError, ConnectionFactory, ConnectionHandle, DirectoryClient, DirectoryOpError,
    DirectorySession, Ldap3Client, Ldap3Session, ReleaseToken, ServerEndpoint, TransportSecurity,
};
pub use plugin::LdapAuthPlugin;

//! LDAP connection module
//!
//! Features:
//! - Implicit TLS (ldaps on port 636) and STARTTLS upgrade
//! - Protocol version 3 only, referrals surfaced instead of followed
//! - Scoped connection handles released on every exit path

mod client;
mod connection;
mod types;

pub use client::{Ldap3Client, Ldap3Session};
pub use connection::{
    ConnectionFactory, ConnectionHandle, DirectoryClient, DirectorySession, ReleaseToken,
    TransportSecurity,
};
pub use types::*;

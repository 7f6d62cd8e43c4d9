//! Settings store trait
//!
//! Defines the interface the gateway uses to read and write plugin settings.
//! Implementations exist for SQLite and for an in-process map.

use async_trait::async_trait;
use ldapgate_core::{Result, SettingValue, TenantId};

/// Per-tenant key/value settings store
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the value stored under `(tenant, name)`. Absent is `Ok(None)`.
    async fn get(&self, tenant: TenantId, name: &str) -> Result<Option<SettingValue>>;

    /// Write `value` under `(tenant, name)`, replacing any previous value.
    /// The value's type tag is stored with it.
    async fn put(&self, tenant: TenantId, name: &str, value: &SettingValue) -> Result<()>;
}


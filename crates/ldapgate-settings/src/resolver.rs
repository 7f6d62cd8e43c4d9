//! Effective-setting resolution under the global-override rule
//!
//! When the global tenant's `enabled` flag is set, every tenant reads the
//! global tenant's values. Per-tenant values stay stored but are shadowed.

use ldapgate_core::types::SETTING_ENABLED;
use ldapgate_core::{Result, SettingValue, TenantId};
use std::sync::Arc;

use crate::traits::SettingsStore;

/// Resolves settings for a tenant. Holds no state besides the store handle.
#[derive(Clone)]
pub struct ConfigResolver {
    store: Arc<dyn SettingsStore>,
}

impl ConfigResolver {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Whether the global override is active
    pub async fn globally_enabled(&self) -> Result<bool> {
        Ok(self
            .store
            .get(TenantId::GLOBAL, SETTING_ENABLED)
            .await?
            .map_or(false, |v| v.is_truthy()))
    }

    /// Effective value of `name` for `tenant`.
    ///
    /// Exactly two store lookups: the override flag, then the value under
    /// the tenant that wins.
    pub async fn effective_setting(
        &self,
        tenant: TenantId,
        name: &str,
    ) -> Result<Option<SettingValue>> {
        let scope = if self.globally_enabled().await? {
            TenantId::GLOBAL
        } else {
            tenant
        };

        self.store.get(scope, name).await
    }

    /// Effective value read as a flag; absent is `false`
    pub async fn effective_flag(&self, tenant: TenantId, name: &str) -> Result<bool> {
        Ok(self
            .effective_setting(tenant, name)
            .await?
            .map_or(false, |v| v.is_truthy()))
    }
}

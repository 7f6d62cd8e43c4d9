//! In-process settings store

use async_trait::async_trait;
use ldapgate_core::types::validate_setting_name;
use ldapgate_core::{Result, SettingValue, TenantId};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::traits::SettingsStore;

/// Settings held in memory, for hosts that persist settings elsewhere
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: RwLock<HashMap<(TenantId, String), SettingValue>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from `(tenant, name, value)` triples
    pub fn with_settings<I, N>(settings: I) -> Self
    where
        I: IntoIterator<Item = (TenantId, N, SettingValue)>,
        N: Into<String>,
    {
        let map = settings
            .into_iter()
            .map(|(tenant, name, value)| ((tenant, name.into()), value))
            .collect();
        Self {
            settings: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.settings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.read().is_empty()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, tenant: TenantId, name: &str) -> Result<Option<SettingValue>> {
        Ok(self
            .settings
            .read()
            .get(&(tenant, name.to_string()))
            .cloned())
    }

    async fn put(&self, tenant: TenantId, name: &str, value: &SettingValue) -> Result<()> {
        validate_setting_name(name)?;
        self.settings
            .write()
            .insert((tenant, name.to_string()), value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_store() {
        let store = MemorySettingsStore::with_settings([
            (TenantId::GLOBAL, "enabled", SettingValue::Bool(true)),
            (TenantId::new(2), "enabled", SettingValue::Bool(false)),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(TenantId::new(2), "enabled").await.unwrap(),
            Some(SettingValue::Bool(false))
        );
        assert!(store.get(TenantId::new(3), "enabled").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemorySettingsStore::new();
        assert!(store.is_empty());

        store.put(TenantId::new(1), "enabled", &true.into()).await.unwrap();
        store.put(TenantId::new(1), "enabled", &false.into()).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(TenantId::new(1), "enabled").await.unwrap(),
            Some(SettingValue::Bool(false))
        );
    }
}

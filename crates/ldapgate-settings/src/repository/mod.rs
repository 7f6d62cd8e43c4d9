//! Settings repository

use async_trait::async_trait;
use chrono::Utc;
use ldapgate_core::types::validate_setting_name;
use ldapgate_core::{Error, Result, SettingType, SettingValue, TenantId};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::traits::SettingsStore;

/// SQLite-backed plugin settings, scoped to one plugin name
pub struct SettingsRepository {
    pool: SqlitePool,
    plugin_name: String,
}

impl SettingsRepository {
    pub async fn new(database_url: &str, plugin_name: &str) -> Result<Self> {
        Self::with_max_connections(database_url, plugin_name, 10).await
    }

    pub async fn with_max_connections(
        database_url: &str,
        plugin_name: &str,
        max_connections: u32,
    ) -> Result<Self> {
        if plugin_name.trim().is_empty() {
            return Err(Error::InvalidArgument("Plugin name is required".into()));
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let repo = Self {
            pool,
            plugin_name: plugin_name.to_string(),
        };
        repo.init().await?;

        Ok(repo)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS plugin_settings (
                plugin_name TEXT NOT NULL,
                context_id INTEGER NOT NULL,
                setting_name TEXT NOT NULL,
                setting_value TEXT NOT NULL,
                setting_type TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (plugin_name, context_id, setting_name)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        info!("Settings store initialized for plugin {}", self.plugin_name);
        Ok(())
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// All settings stored for a tenant, ordered by name
    pub async fn list(&self, tenant: TenantId) -> Result<Vec<(String, SettingValue)>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT setting_name, setting_value, setting_type
            FROM plugin_settings
            WHERE plugin_name = ? AND context_id = ?
            ORDER BY setting_name
            "#,
        )
        .bind(&self.plugin_name)
        .bind(i64::from(tenant.get()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(|(name, raw, ty)| {
                let value = decode(&name, &ty, &raw)?;
                Ok((name, value))
            })
            .collect()
    }
}

fn decode(name: &str, setting_type: &str, raw: &str) -> Result<SettingValue> {
    let setting_type: SettingType = setting_type.parse()?;
    SettingValue::from_stored(name, setting_type, raw)
}

#[async_trait]
impl SettingsStore for SettingsRepository {
    async fn get(&self, tenant: TenantId, name: &str) -> Result<Option<SettingValue>> {
        let row: Option<(String, String)> = sqlx::query_as(
            r#"
            SELECT setting_value, setting_type
            FROM plugin_settings
            WHERE plugin_name = ? AND context_id = ? AND setting_name = ?
            "#,
        )
        .bind(&self.plugin_name)
        .bind(i64::from(tenant.get()))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        row.map(|(raw, ty)| decode(name, &ty, &raw)).transpose()
    }

    async fn put(&self, tenant: TenantId, name: &str, value: &SettingValue) -> Result<()> {
        validate_setting_name(name)?;

        sqlx::query(
            r#"
            INSERT INTO plugin_settings
                (plugin_name, context_id, setting_name, setting_value, setting_type, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (plugin_name, context_id, setting_name) DO UPDATE SET
                setting_value = excluded.setting_value,
                setting_type = excluded.setting_type,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.plugin_name)
        .bind(i64::from(tenant.get()))
        .bind(name)
        .bind(value.to_stored())
        .bind(value.setting_type().as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        debug!(
            "Stored setting {} for tenant {} ({})",
            name,
            tenant,
            value.setting_type()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_repo(plugin: &str) -> SettingsRepository {
        SettingsRepository::with_max_connections("sqlite::memory:", plugin, 1)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_setting_is_none() {
        let repo = memory_repo("ldapauthplugin").await;
        let value = repo.get(TenantId::new(3), "enabled").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_put_then_get_keeps_type() {
        let repo = memory_repo("ldapauthplugin").await;
        let tenant = TenantId::new(3);

        repo.put(tenant, "enabled", &SettingValue::Bool(true)).await.unwrap();
        repo.put(tenant, "port", &SettingValue::Int(389)).await.unwrap();
        repo.put(tenant, "host", &SettingValue::from("ldap.example.org"))
            .await
            .unwrap();

        assert_eq!(
            repo.get(tenant, "enabled").await.unwrap(),
            Some(SettingValue::Bool(true))
        );
        assert_eq!(repo.get(tenant, "port").await.unwrap(), Some(SettingValue::Int(389)));
        assert_eq!(
            repo.get(tenant, "host").await.unwrap().unwrap().as_str(),
            Some("ldap.example.org")
        );
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let repo = memory_repo("ldapauthplugin").await;
        let tenant = TenantId::new(1);

        repo.put(tenant, "enabled", &SettingValue::Bool(true)).await.unwrap();
        repo.put(tenant, "enabled", &SettingValue::Bool(false)).await.unwrap();

        assert_eq!(
            repo.get(tenant, "enabled").await.unwrap(),
            Some(SettingValue::Bool(false))
        );
    }

    #[tokio::test]
    async fn test_tenants_are_isolated() {
        let repo = memory_repo("ldapauthplugin").await;

        repo.put(TenantId::GLOBAL, "enabled", &SettingValue::Bool(true))
            .await
            .unwrap();

        assert!(repo.get(TenantId::new(7), "enabled").await.unwrap().is_none());
        assert_eq!(repo.list(TenantId::GLOBAL).await.unwrap().len(), 1);
        assert!(repo.list(TenantId::new(7)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let repo = memory_repo("ldapauthplugin").await;
        let err = repo
            .put(TenantId::GLOBAL, "", &SettingValue::Bool(true))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "InvalidSettingName");
    }

    #[tokio::test]
    async fn test_malformed_row_is_storage_error() {
        let repo = memory_repo("ldapauthplugin").await;

        sqlx::query(
            "INSERT INTO plugin_settings VALUES ('ldapauthplugin', 0, 'enabled', 'perhaps', 'bool', '')",
        )
        .execute(&repo.pool)
        .await
        .unwrap();

        let err = repo.get(TenantId::GLOBAL, "enabled").await.unwrap_err();
        assert!(err.is_storage_failure());
    }
}

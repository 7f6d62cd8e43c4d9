//! Subcommand implementations

use anyhow::{anyhow, Result};
use ldapgate_auth::{
    ConnectionFactory, InterceptDecision, Ldap3Client, LdapAuthPlugin, RequestGate,
    TransportSecurity,
};
use ldapgate_core::{GatewayConfig, TenantId};
use ldapgate_settings::{ConfigResolver, SettingsRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

async fn open_resolver(config: &GatewayConfig) -> Result<ConfigResolver> {
    debug!("Opening settings database: {}", config.database.url);

    let repo = SettingsRepository::with_max_connections(
        &config.database.url,
        &config.ldap.plugin_name,
        config.database.max_connections,
    )
    .await?;

    Ok(ConfigResolver::new(Arc::new(repo)))
}

fn connection_factory(config: &GatewayConfig) -> ConnectionFactory<Ldap3Client> {
    ConnectionFactory::new(
        Ldap3Client::from_config(&config.ldap),
        Duration::from_secs(config.ldap.timeout_seconds),
    )
}

async fn open_plugin(
    config: &GatewayConfig,
    tenant: TenantId,
) -> Result<LdapAuthPlugin<Ldap3Client>> {
    let gate = RequestGate::new(open_resolver(config).await?);
    Ok(LdapAuthPlugin::new(tenant, gate, connection_factory(config)))
}

pub async fn resolve(config: &GatewayConfig, tenant: TenantId, name: &str) -> Result<()> {
    let resolver = open_resolver(config).await?;

    match resolver.effective_setting(tenant, name).await? {
        Some(value) => println!("{}", value),
        None => println!("(not set)"),
    }
    Ok(())
}

pub async fn check(
    config: &GatewayConfig,
    tenant: TenantId,
    page: &str,
    operation: &str,
) -> Result<()> {
    let plugin = open_plugin(config, tenant).await?;

    match plugin.handle_request(page, operation).await? {
        InterceptDecision::Intercept(handler) => println!("intercept {}", handler.name()),
        InterceptDecision::PassThrough => println!("pass-through"),
    }
    Ok(())
}

pub async fn set_enabled(config: &GatewayConfig, tenant: TenantId, enabled: bool) -> Result<()> {
    let plugin = open_plugin(config, tenant).await?;

    if !plugin.can_enable().await? {
        info!(
            "Global override is active; the flag for tenant {} is stored but shadowed",
            tenant
        );
    }

    plugin.set_enabled(enabled).await?;
    println!(
        "{} {} for tenant {}",
        plugin.name(),
        if enabled { "enabled" } else { "disabled" },
        tenant
    );
    Ok(())
}

pub async fn status(config: &GatewayConfig, tenant: TenantId) -> Result<()> {
    let plugin = open_plugin(config, tenant).await?;

    println!("plugin:            {}", plugin.name());
    println!("tenant:            {}", tenant);
    println!("enabled:           {}", plugin.enabled().await?);
    println!("globally enabled:  {}", plugin.globally_enabled().await?);
    println!("can enable:        {}", plugin.can_enable().await?);
    println!("can disable:       {}", plugin.can_disable().await?);
    println!("settings action:   {}", plugin.settings_action_available().await?);
    Ok(())
}

pub async fn connect(config: &GatewayConfig, server_uri: &str) -> Result<()> {
    // No settings database needed to check a server
    let handle = connection_factory(config)
        .connect(server_uri)
        .await
        .map_err(|e| anyhow!("{} ({})", e, e.kind()))?;

    let security = match handle.security() {
        TransportSecurity::ImplicitTls => "implicit TLS",
        TransportSecurity::StartTls => "STARTTLS",
    };
    println!("connected to {} using {}", handle.endpoint(), security);

    handle.release();
    Ok(())
}

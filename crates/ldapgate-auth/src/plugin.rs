//! LDAP authentication plugin
//!
//! Binds the gate and the connection factory to the tenant of the current
//! request and carries the plugin lifecycle rules the host asks about:
//! - who may toggle the plugin while the global override is active
//! - whether the settings action is offered
//! - request interception and directory connections

use ldapgate_core::{Result, TenantId};
use tracing::{debug, warn};

use crate::gate::{InterceptDecision, RequestGate};
use crate::ldap::{ConnectionError, ConnectionFactory, ConnectionHandle, DirectoryClient};

/// Plugin instance for one request context
pub struct LdapAuthPlugin<C: DirectoryClient> {
    tenant: TenantId,
    gate: RequestGate,
    connections: ConnectionFactory<C>,
}

impl<C: DirectoryClient> LdapAuthPlugin<C> {
    pub fn new(tenant: TenantId, gate: RequestGate, connections: ConnectionFactory<C>) -> Self {
        Self {
            tenant,
            gate,
            connections,
        }
    }

    pub fn name(&self) -> &'static str {
        "LDAPAuthPlugin"
    }

    /// Installed host-wide, enabled per tenant
    pub fn is_site_plugin(&self) -> bool {
        true
    }

    pub fn tenant(&self) -> TenantId {
        self.tenant
    }

    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// Effective enablement for the bound tenant
    pub async fn enabled(&self) -> Result<bool> {
        self.gate.enabled(self.tenant).await
    }

    /// Whether the global override is active
    pub async fn globally_enabled(&self) -> Result<bool> {
        self.gate.resolver().globally_enabled().await
    }

    /// While the global override is active only the global tenant may
    /// toggle the plugin.
    pub async fn can_enable(&self) -> Result<bool> {
        Ok(!self.globally_enabled().await? || self.tenant.is_global())
    }

    pub async fn can_disable(&self) -> Result<bool> {
        self.can_enable().await
    }

    /// Whether the host should offer the settings action for this tenant
    pub async fn settings_action_available(&self) -> Result<bool> {
        Ok(self.enabled().await? && self.can_disable().await?)
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.gate.set_enabled(self.tenant, enabled).await?;
        debug!(
            "{} {} for tenant {}",
            self.name(),
            if enabled { "enabled" } else { "disabled" },
            self.tenant
        );
        Ok(())
    }

    /// Dispatch hook: decide whether the request goes to the directory handler
    pub async fn handle_request(&self, page: &str, operation: &str) -> Result<InterceptDecision> {
        let decision = self
            .gate
            .should_intercept(page, operation, self.tenant)
            .await?;

        if let Some(handler) = decision.delegate() {
            debug!(
                "Routing {}/{} for tenant {} to {}",
                page,
                operation,
                self.tenant,
                handler.name()
            );
        }

        Ok(decision)
    }

    /// Open a negotiated directory connection for an authentication attempt
    pub async fn connect(
        &self,
        server_uri: &str,
    ) -> std::result::Result<ConnectionHandle<C::Session>, ConnectionError> {
        self.connections.connect(server_uri).await.map_err(|e| {
            warn!("Directory connection to {} failed: {}", server_uri, e);
            e
        })
    }
}

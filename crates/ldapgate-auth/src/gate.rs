//! Request routing gate
//!
//! Decides, per incoming `(page, operation)` pair, whether the request is an
//! authentication operation that belongs to the directory handler. The
//! operation lists are closed and matched exactly.

use ldapgate_core::types::SETTING_ENABLED;
use ldapgate_core::{Result, SettingValue, TenantId};
use ldapgate_settings::ConfigResolver;

/// Page whose every operation is handled by the directory handler
pub const LDAP_PAGE: &str = "ldap";

/// Login page operations taken over when enabled
pub const LOGIN_OPERATIONS: [&str; 6] = [
    "changePassword",
    "lostPassword",
    "requestResetPassword",
    "savePassword",
    "signIn",
    "signOut",
];

/// User page operations taken over when enabled
pub const USER_OPERATIONS: [&str; 2] = ["activateUser", "validate"];

/// Handler the host transfers control to on interception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelegateHandler {
    /// Directory-backed login, password and account handler
    Ldap,
}

impl DelegateHandler {
    pub fn name(&self) -> &'static str {
        match self {
            DelegateHandler::Ldap => "LDAPHandler",
        }
    }
}

/// Outcome of asking the gate about a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptDecision {
    PassThrough,
    Intercept(DelegateHandler),
}

impl InterceptDecision {
    pub fn is_intercept(&self) -> bool {
        matches!(self, InterceptDecision::Intercept(_))
    }

    pub fn delegate(&self) -> Option<DelegateHandler> {
        match self {
            InterceptDecision::Intercept(handler) => Some(*handler),
            InterceptDecision::PassThrough => None,
        }
    }
}

/// Decision for a request given the tenant's enablement flag
pub fn classify(page: &str, operation: &str, enabled: bool) -> InterceptDecision {
    if !enabled {
        return InterceptDecision::PassThrough;
    }

    let handled = match page {
        LDAP_PAGE => true,
        "login" => LOGIN_OPERATIONS.contains(&operation),
        "user" => USER_OPERATIONS.contains(&operation),
        _ => false,
    };

    if handled {
        InterceptDecision::Intercept(DelegateHandler::Ldap)
    } else {
        InterceptDecision::PassThrough
    }
}

/// Stateless gate; reads the enablement flag through the resolver on every call
#[derive(Clone)]
pub struct RequestGate {
    resolver: ConfigResolver,
}

impl RequestGate {
    pub fn new(resolver: ConfigResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Effective enablement for `tenant`
    pub async fn enabled(&self, tenant: TenantId) -> Result<bool> {
        self.resolver.effective_flag(tenant, SETTING_ENABLED).await
    }

    pub async fn should_intercept(
        &self,
        page: &str,
        operation: &str,
        tenant: TenantId,
    ) -> Result<InterceptDecision> {
        let enabled = self.enabled(tenant).await?;
        Ok(classify(page, operation, enabled))
    }

    /// Store the `enabled` flag for `tenant`. The global-override rule is not
    /// applied here: a tenant flag written while the override is active is
    /// kept but shadowed.
    pub async fn set_enabled(&self, tenant: TenantId, enabled: bool) -> Result<()> {
        self.resolver
            .store()
            .put(tenant, SETTING_ENABLED, &SettingValue::Bool(enabled))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldapgate_settings::{MemorySettingsStore, SettingsStore};
    use std::sync::Arc;

    fn gate_with(settings: Vec<(TenantId, &'static str, SettingValue)>) -> RequestGate {
        let store = MemorySettingsStore::with_settings(settings);
        RequestGate::new(ConfigResolver::new(Arc::new(store)))
    }

    #[test]
    fn test_classify_whitelists() {
        let ldap = InterceptDecision::Intercept(DelegateHandler::Ldap);

        for op in LOGIN_OPERATIONS {
            assert_eq!(classify("login", op, true), ldap, "login/{}", op);
        }
        for op in USER_OPERATIONS {
            assert_eq!(classify("user", op, true), ldap, "user/{}", op);
        }
        for op in ["", "index", "anything", "signIn"] {
            assert_eq!(classify("ldap", op, true), ldap);
        }
    }

    #[test]
    fn test_classify_exact_match_only() {
        for (page, op) in [
            ("login", "unknownOp"),
            ("login", "signin"),
            ("login", "signIn "),
            ("login", "sign"),
            ("login", "signInNow"),
            ("login", "activateUser"),
            ("user", "signIn"),
            ("user", "validateEmail"),
            ("LDAP", "signIn"),
            ("ldaps", "index"),
            ("index", "index"),
            ("", ""),
        ] {
            assert_eq!(
                classify(page, op, true),
                InterceptDecision::PassThrough,
                "{}/{}",
                page,
                op
            );
        }
    }

    #[test]
    fn test_classify_disabled_never_intercepts() {
        assert_eq!(classify("ldap", "index", false), InterceptDecision::PassThrough);
        assert_eq!(classify("login", "signIn", false), InterceptDecision::PassThrough);
        assert_eq!(classify("user", "validate", false), InterceptDecision::PassThrough);
    }

    #[test]
    fn test_decision_accessors() {
        let decision = classify("login", "signOut", true);
        assert!(decision.is_intercept());
        assert_eq!(decision.delegate().map(|h| h.name()), Some("LDAPHandler"));
        assert_eq!(InterceptDecision::PassThrough.delegate(), None);
    }

    #[tokio::test]
    async fn test_enabled_tenant_activate_user() {
        let gate = gate_with(vec![(TenantId::new(5), "enabled", SettingValue::Bool(true))]);

        let decision = gate
            .should_intercept("user", "activateUser", TenantId::new(5))
            .await
            .unwrap();

        assert_eq!(decision, InterceptDecision::Intercept(DelegateHandler::Ldap));
    }

    #[tokio::test]
    async fn test_disabled_tenant_passes_through() {
        let gate = gate_with(vec![(TenantId::new(5), "enabled", SettingValue::Bool(false))]);

        let decision = gate
            .should_intercept("user", "activateUser", TenantId::new(5))
            .await
            .unwrap();

        assert_eq!(decision, InterceptDecision::PassThrough);
    }

    #[tokio::test]
    async fn test_global_override_wins_over_tenant_flag() {
        let gate = gate_with(vec![
            (TenantId::GLOBAL, "enabled", SettingValue::Bool(true)),
            (TenantId::new(5), "enabled", SettingValue::Bool(false)),
        ]);

        assert!(gate.enabled(TenantId::new(5)).await.unwrap());
        assert!(gate
            .should_intercept("login", "signIn", TenantId::new(5))
            .await
            .unwrap()
            .is_intercept());
    }

    #[tokio::test]
    async fn test_unknown_tenant_is_disabled() {
        let gate = gate_with(vec![]);

        let decision = gate
            .should_intercept("ldap", "index", TenantId::new(11))
            .await
            .unwrap();

        assert_eq!(decision, InterceptDecision::PassThrough);
    }

    #[tokio::test]
    async fn test_repeated_calls_agree() {
        let gate = gate_with(vec![(TenantId::new(3), "enabled", SettingValue::Bool(true))]);

        let first = gate.should_intercept("login", "signIn", TenantId::new(3)).await.unwrap();
        let second = gate.should_intercept("login", "signIn", TenantId::new(3)).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_set_enabled_round_trip() {
        let gate = gate_with(vec![]);
        let tenant = TenantId::new(8);

        gate.set_enabled(tenant, true).await.unwrap();
        assert!(gate.should_intercept("ldap", "x", tenant).await.unwrap().is_intercept());

        gate.set_enabled(tenant, false).await.unwrap();
        assert!(!gate.should_intercept("ldap", "x", tenant).await.unwrap().is_intercept());
    }

    #[tokio::test]
    async fn test_set_enabled_under_override_is_shadowed() {
        let gate = gate_with(vec![(TenantId::GLOBAL, "enabled", SettingValue::Bool(true))]);
        let tenant = TenantId::new(4);

        gate.set_enabled(tenant, false).await.unwrap();

        assert_eq!(
            gate.resolver().store().get(tenant, "enabled").await.unwrap(),
            Some(SettingValue::Bool(false))
        );
        assert!(gate.enabled(tenant).await.unwrap());
    }
}

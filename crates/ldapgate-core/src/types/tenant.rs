//! Tenant (context) identity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies a tenant of the host. Tenant `0` is the host-wide scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TenantId(u32);

impl TenantId {
    /// The global (host-wide) tenant
    pub const GLOBAL: TenantId = TenantId(0);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_global(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for TenantId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(TenantId)
            .map_err(|e| crate::Error::InvalidArgument(format!("Invalid tenant id '{}': {}", s, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_tenant() {
        assert!(TenantId::GLOBAL.is_global());
        assert!(TenantId::default().is_global());
        assert!(!TenantId::new(5).is_global());
    }

    #[test]
    fn test_parse_tenant() {
        assert_eq!("5".parse::<TenantId>().unwrap(), TenantId::new(5));
        assert_eq!(" 0 ".parse::<TenantId>().unwrap(), TenantId::GLOBAL);
        assert!("-1".parse::<TenantId>().is_err());
        assert!("journal".parse::<TenantId>().is_err());
    }
}

//! Settings storage for Ldapgate
//!
//! Per-tenant plugin settings with a SQLite backend and an in-process store,
//! plus the resolver that applies the global-override rule.

pub mod memory;
pub mod repository;
pub mod resolver;
pub mod traits;

pub use memory::MemorySettingsStore;
pub use repository::SettingsRepository;
pub use resolver::ConfigResolver;
pub use traits::*;

//! Core types for Ldapgate

mod setting;
mod tenant;

pub use setting::*;
pub use tenant::*;

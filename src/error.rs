//! Error types for SkipKV.
//!
//! A missing or expired key is not an error: lookups return `Option`.
//! The variants here cover caller mistakes that can be reported and
//! recovered from. Corruption of the index itself panics instead.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by the store and its configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A TTL of zero would make the key expire before it is ever readable
    #[error("ttl must be greater than zero")]
    ZeroTtl,

    /// The deadline `now + ttl` cannot be represented
    #[error("ttl of {0:?} overflows the clock")]
    TtlOverflow(Duration),

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The store was opened outside a Tokio runtime
    #[error("no tokio runtime available to drive background expiry")]
    NoRuntime,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

//! Store configuration.

use crate::error::{Result, StoreError};
use crate::storage::score::ScoreMode;
use crate::storage::skiplist::{DEFAULT_MAX_LEVEL, MAX_HEIGHT};
use std::time::Duration;

/// What `get` does when it finds an expired key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LazyExpiry {
    /// Report the key as missing and remove it on a background task. The
    /// element may stay indexed for a moment after `get` returns.
    #[default]
    Deferred,
    /// Remove the key before `get` returns.
    Inline,
}

/// Configuration for a [`SkipListStore`](crate::SkipListStore).
///
/// ```
/// use skipkv::{LazyExpiry, StoreConfig};
/// use std::time::Duration;
///
/// let config = StoreConfig {
///     reap_interval: Duration::from_millis(250),
///     lazy_expiry: LazyExpiry::Inline,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Interval between reaper sweeps (default: 1s)
    pub reap_interval: Duration,

    /// Level ceiling of the skip list (default: 32, at most 64)
    pub max_level: usize,

    /// How keys are turned into scores (default: FNV-1a hash)
    pub score_mode: ScoreMode,

    /// Behaviour of `get` on an expired key
    pub lazy_expiry: LazyExpiry,

    /// Seed for level draws; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            reap_interval: Duration::from_secs(1),
            max_level: DEFAULT_MAX_LEVEL,
            score_mode: ScoreMode::default(),
            lazy_expiry: LazyExpiry::default(),
            seed: None,
        }
    }
}

impl StoreConfig {
    /// Checks that every value is in range.
    pub fn validate(&self) -> Result<()> {
        if self.reap_interval.is_zero() {
            return Err(StoreError::InvalidConfig(
                "reap_interval must be greater than zero".to_string(),
            ));
        }
        if !(1..=MAX_HEIGHT).contains(&self.max_level) {
            return Err(StoreError::InvalidConfig(format!(
                "max_level must be between 1 and {MAX_HEIGHT}, got {}",
                self.max_level
            )));
        }
        Ok(())
    }
}

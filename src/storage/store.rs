//! Key-Value Store with TTL Support
//!
//! This module implements the byte-keyed map that callers talk to. It sits on
//! top of the [`SkipList`] engine, turns keys into scores and keeps the TTL
//! table that decides when keys disappear.
//!
//! ## Design Decisions
//!
//! 1. **Two locks, one order**: the index and the TTL table each have their
//!    own `RwLock`. Any operation that needs both takes the index lock first
//!    and the TTL lock second, so the two can never deadlock.
//! 2. **Lazy + active expiry**: `get` notices expired keys on access and the
//!    reaper sweeps the rest in the background.
//! 3. **Re-checked eviction**: both expiry paths re-read the deadline under
//!    the write locks before removing anything, so a key that was set again
//!    after the deadline was observed survives.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SkipListStore                         │
//! │  ┌──────────────────────────┐   ┌────────────────────────┐  │
//! │  │  RwLock<SkipList>        │──>│ RwLock<HashMap<key,    │  │
//! │  │  (outer lock)            │   │        deadline>>      │  │
//! │  └──────────────────────────┘   │ (inner lock)           │  │
//! │                                 └────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!              ▲                               ▲
//!              │ deferred lazy delete          │ periodic sweep
//!        ┌─────┴──────┐                 ┌──────┴──────┐
//!        │ tokio task │                 │   Reaper    │
//!        └────────────┘                 └─────────────┘
//! ```

use super::reaper::Reaper;
use super::score::{Score, ScoreMode};
use super::skiplist::SkipList;
use crate::config::{LazyExpiry, StoreConfig};
use crate::error::{Result, StoreError};
use bytes::Bytes;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{info, trace};

type TtlTable = HashMap<Bytes, Instant>;

/// Returns true if `key` has no deadline or its deadline is still ahead.
#[inline]
fn is_live(ttl: &TtlTable, key: &[u8], now: Instant) -> bool {
    ttl.get(key).map_or(true, |&deadline| now < deadline)
}

/// State shared between the store handle, the reaper and deferred deletes.
pub(crate) struct StoreCore {
    index: RwLock<SkipList>,
    ttl: RwLock<TtlTable>,
    score_mode: ScoreMode,
    lazy_expiry: LazyExpiry,
    runtime: Handle,

    get_count: AtomicU64,
    set_count: AtomicU64,
    del_count: AtomicU64,
    lazy_expired_count: AtomicU64,
    reaped_count: AtomicU64,
}

impl StoreCore {
    fn index(&self) -> RwLockReadGuard<'_, SkipList> {
        self.index.read().expect("skip list lock poisoned")
    }

    fn index_mut(&self) -> RwLockWriteGuard<'_, SkipList> {
        self.index.write().expect("skip list lock poisoned")
    }

    fn ttl(&self) -> RwLockReadGuard<'_, TtlTable> {
        self.ttl.read().expect("ttl table lock poisoned")
    }

    fn ttl_mut(&self) -> RwLockWriteGuard<'_, TtlTable> {
        self.ttl.write().expect("ttl table lock poisoned")
    }

    #[inline]
    fn score(&self, key: &[u8]) -> Score {
        self.score_mode.score(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.index().len()
    }

    /// Removes `key` if its deadline has passed, checked under both locks.
    fn remove_if_expired(&self, key: &[u8]) -> bool {
        let score = self.score(key);
        let mut index = self.index_mut();
        let mut ttl = self.ttl_mut();

        match ttl.get(key) {
            Some(&deadline) if Instant::now() >= deadline => {}
            _ => return false,
        }
        ttl.remove(key);
        index.delete(key, score).is_some()
    }

    /// Handles an expired key seen by `get`.
    fn expire_lazily(self: &Arc<Self>, key: &[u8]) {
        match self.lazy_expiry {
            LazyExpiry::Inline => {
                if self.remove_if_expired(key) {
                    self.lazy_expired_count.fetch_add(1, Ordering::Relaxed);
                }
            }
            LazyExpiry::Deferred => {
                let core = Arc::clone(self);
                let key = Bytes::copy_from_slice(key);
                self.runtime.spawn(async move {
                    if core.remove_if_expired(&key) {
                        core.lazy_expired_count.fetch_add(1, Ordering::Relaxed);
                        trace!(key = %String::from_utf8_lossy(&key), "expired key removed lazily");
                    }
                });
            }
        }
    }

    /// Evicts every key whose deadline has passed.
    ///
    /// The expired keys are collected under the TTL read lock, which is
    /// released before any eviction takes the write locks.
    pub(crate) fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<Bytes> = self
            .ttl()
            .iter()
            .filter(|(_, &deadline)| now >= deadline)
            .map(|(key, _)| key.clone())
            .collect();

        let removed = expired
            .iter()
            .filter(|key| self.remove_if_expired(key))
            .count();

        if removed > 0 {
            self.reaped_count
                .fetch_add(removed as u64, Ordering::Relaxed);
        }
        removed
    }
}

/// A concurrent ordered key-value store with per-key expiry.
///
/// Wrap it in an `Arc` to share it between threads or tasks; every method
/// takes `&self`. The store must be created inside a Tokio runtime (or be
/// given a runtime [`Handle`]) because expiry runs on background tasks.
///
/// # Example
///
/// ```
/// use skipkv::SkipListStore;
/// use bytes::Bytes;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> skipkv::Result<()> {
/// let store = SkipListStore::new()?;
///
/// store.set(Bytes::from("name"), Bytes::from("Ariz"));
/// assert_eq!(store.get(b"name"), Some(Bytes::from("Ariz")));
///
/// store.set_with_ttl(Bytes::from("session"), Bytes::from("abc123"), Duration::from_secs(60))?;
/// assert!(store.ttl(b"session").is_some());
///
/// store.close();
/// # Ok(())
/// # }
/// ```
pub struct SkipListStore {
    pub(crate) core: Arc<StoreCore>,
    reaper: Reaper,
}

impl std::fmt::Debug for SkipListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkipListStore")
            .field("index", &*self.core.index())
            .field("score_mode", &self.core.score_mode)
            .field("lazy_expiry", &self.core.lazy_expiry)
            .field("closed", &self.reaper.is_stopped())
            .finish()
    }
}

impl SkipListStore {
    /// Opens a store with the default configuration on the current runtime.
    pub fn new() -> Result<Self> {
        Self::open(StoreConfig::default())
    }

    /// Opens a store on the current Tokio runtime.
    ///
    /// Returns [`StoreError::NoRuntime`] when called outside a runtime.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        Self::open_with_handle(config, runtime)
    }

    /// Opens a store whose background work runs on `runtime`.
    ///
    /// The store can then be used from any thread, including ones that are
    /// not part of the runtime.
    pub fn open_with_handle(config: StoreConfig, runtime: Handle) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let core = Arc::new(StoreCore {
            index: RwLock::new(SkipList::with_rng(config.max_level, rng)),
            ttl: RwLock::new(HashMap::new()),
            score_mode: config.score_mode,
            lazy_expiry: config.lazy_expiry,
            runtime: runtime.clone(),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
            lazy_expired_count: AtomicU64::new(0),
            reaped_count: AtomicU64::new(0),
        });

        let reaper = Reaper::start(Arc::clone(&core), config.reap_interval, &runtime);

        info!(
            max_level = config.max_level,
            score_mode = ?config.score_mode,
            lazy_expiry = ?config.lazy_expiry,
            "Skip list store opened"
        );

        Ok(Self { core, reaper })
    }

    /// The score `key` is placed at in the index.
    #[inline]
    pub fn score_of(&self, key: &[u8]) -> Score {
        self.core.score(key)
    }

    /// The configured score mode.
    pub fn score_mode(&self) -> ScoreMode {
        self.core.score_mode
    }

    /// Sets a key-value pair without expiry.
    ///
    /// Any TTL previously attached to the key is cleared.
    ///
    /// # Returns
    ///
    /// Returns `true` if a new key was created, `false` if an existing key was updated.
    pub fn set(&self, key: Bytes, value: Bytes) -> bool {
        self.core.set_count.fetch_add(1, Ordering::Relaxed);
        let score = self.core.score(&key);

        let mut index = self.core.index_mut();
        let mut ttl = self.core.ttl_mut();

        let before = index.len();
        ttl.remove(&key[..]);
        index.insert(key, value, score);
        index.len() > before
    }

    /// Sets a key-value pair that expires after `ttl`.
    ///
    /// A TTL already attached to the key is replaced. A zero `ttl`, or one
    /// too large to add to the current instant, is rejected and nothing is
    /// written.
    ///
    /// # Returns
    ///
    /// Returns `true` if a new key was created, `false` if an existing key was updated.
    pub fn set_with_ttl(&self, key: Bytes, value: Bytes, ttl: Duration) -> Result<bool> {
        let deadline = deadline_after(ttl)?;
        self.core.set_count.fetch_add(1, Ordering::Relaxed);
        let score = self.core.score(&key);

        let mut index = self.core.index_mut();
        let mut table = self.core.ttl_mut();

        let before = index.len();
        table.insert(key.clone(), deadline);
        index.insert(key, value, score);
        Ok(index.len() > before)
    }

    /// Gets the value for a key.
    ///
    /// Returns `None` if the key doesn't exist or has expired. An expired key
    /// is removed according to the configured [`LazyExpiry`]; with
    /// `Deferred` the element can still be counted by [`len`](Self::len)
    /// for a moment after this returns.
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.core.get_count.fetch_add(1, Ordering::Relaxed);
        let score = self.core.score(key);

        {
            let index = self.core.index();
            let live = is_live(&self.core.ttl(), key, Instant::now());
            if live {
                return index.search(key, score).map(|e| e.value().clone());
            }
        }

        self.core.expire_lazily(key);
        None
    }

    /// Checks if a key exists (and is not expired).
    pub fn exists(&self, key: &[u8]) -> bool {
        let score = self.core.score(key);
        let index = self.core.index();
        let ttl = self.core.ttl();

        is_live(&ttl, key, Instant::now()) && index.search(key, score).is_some()
    }

    /// Deletes a key and its TTL.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key was deleted, `false` if it didn't exist.
    pub fn delete(&self, key: &[u8]) -> bool {
        self.core.del_count.fetch_add(1, Ordering::Relaxed);
        let score = self.core.score(key);

        let mut index = self.core.index_mut();
        let mut ttl = self.core.ttl_mut();

        ttl.remove(key);
        index.delete(key, score).is_some()
    }

    /// Gets the time left before a key expires.
    ///
    /// Returns `None` if the key has no TTL, has already expired, or doesn't exist.
    pub fn ttl(&self, key: &[u8]) -> Option<Duration> {
        let deadline = *self.core.ttl().get(key)?;
        let remaining = deadline.saturating_duration_since(Instant::now());
        (!remaining.is_zero()).then_some(remaining)
    }

    /// Sets an expiry time on an existing key.
    ///
    /// # Returns
    ///
    /// Returns `true` if the expiry was set, `false` if the key doesn't exist
    /// or has already expired.
    pub fn expire(&self, key: &[u8], ttl: Duration) -> Result<bool> {
        let deadline = deadline_after(ttl)?;
        let score = self.core.score(key);

        let mut index = self.core.index_mut();
        let mut table = self.core.ttl_mut();

        let owned = match index.search(key, score) {
            Some(element) => element.key().clone(),
            None => return Ok(false),
        };
        if !is_live(&table, key, Instant::now()) {
            table.remove(key);
            index.delete(key, score);
            self.core.lazy_expired_count.fetch_add(1, Ordering::Relaxed);
            return Ok(false);
        }

        table.insert(owned, deadline);
        Ok(true)
    }

    /// Removes the expiry from a key (makes it persistent).
    ///
    /// # Returns
    ///
    /// Returns `true` if the expiry was removed, `false` if the key doesn't exist,
    /// has expired, or didn't have an expiry.
    pub fn persist(&self, key: &[u8]) -> bool {
        let mut ttl = self.core.ttl_mut();
        match ttl.get(key) {
            Some(&deadline) if Instant::now() < deadline => ttl.remove(key).is_some(),
            _ => false,
        }
    }

    /// Returns a snapshot of every live key, in index order.
    ///
    /// With [`ScoreMode::Ordered`] this is ascending byte order; with
    /// [`ScoreMode::Hashed`] the order is arbitrary but stable.
    pub fn keys(&self) -> Vec<Bytes> {
        let index = self.core.index();
        let ttl = self.core.ttl();
        let now = Instant::now();

        index
            .iter()
            .filter(|e| is_live(&ttl, e.key(), now))
            .map(|e| e.key().clone())
            .collect()
    }

    /// Returns the live entries whose key starts with `prefix`.
    ///
    /// At most `limit` entries are returned; `0` means no limit. With
    /// [`ScoreMode::Ordered`] the scan seeks straight to the prefix and stops
    /// at the first key past it, otherwise it walks the whole index.
    pub fn scan(&self, prefix: &[u8], limit: usize) -> BTreeMap<Bytes, Bytes> {
        let index = self.core.index();
        let ttl = self.core.ttl();
        let now = Instant::now();
        let limit = if limit == 0 { usize::MAX } else { limit };

        if self.core.score_mode.preserves_key_order() {
            index
                .iter_from(self.core.score(prefix), prefix)
                .take_while(|e| e.key().starts_with(prefix))
                .filter(|e| is_live(&ttl, e.key(), now))
                .take(limit)
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect()
        } else {
            index
                .iter()
                .filter(|e| e.key().starts_with(prefix) && is_live(&ttl, e.key(), now))
                .take(limit)
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect()
        }
    }

    /// Number of indexed elements, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Returns true if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of indexed elements that have not expired.
    pub fn len_active(&self) -> usize {
        let index = self.core.index();
        let ttl = self.core.ttl();
        let now = Instant::now();

        index.iter().filter(|e| is_live(&ttl, e.key(), now)).count()
    }

    /// Evicts every expired key now instead of waiting for the reaper.
    ///
    /// # Returns
    ///
    /// Returns the number of keys that were evicted.
    pub fn remove_expired(&self) -> usize {
        self.core.remove_expired()
    }

    /// Removes every key and TTL.
    pub fn flush(&self) {
        let mut index = self.core.index_mut();
        let mut ttl = self.core.ttl_mut();
        index.clear();
        ttl.clear();
    }

    /// Returns store statistics.
    pub fn stats(&self) -> StoreStats {
        let (keys, levels) = {
            let index = self.core.index();
            (index.len(), index.level())
        };
        StoreStats {
            keys,
            keys_with_ttl: self.core.ttl().len(),
            levels,
            get_ops: self.core.get_count.load(Ordering::Relaxed),
            set_ops: self.core.set_count.load(Ordering::Relaxed),
            del_ops: self.core.del_count.load(Ordering::Relaxed),
            lazy_expired: self.core.lazy_expired_count.load(Ordering::Relaxed),
            reaped: self.core.reaped_count.load(Ordering::Relaxed),
        }
    }

    /// Stops background reaping.
    ///
    /// Only the first call has an effect and returns `true`. The store stays
    /// fully usable afterwards; expired keys are then only removed lazily or
    /// by [`remove_expired`](Self::remove_expired). Dropping the store closes it.
    pub fn close(&self) -> bool {
        self.reaper.stop()
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.reaper.is_stopped()
    }
}

/// Computes `now + ttl`, rejecting zero and overflowing durations.
fn deadline_after(ttl: Duration) -> Result<Instant> {
    if ttl.is_zero() {
        return Err(StoreError::ZeroTtl);
    }
    Instant::now()
        .checked_add(ttl)
        .ok_or(StoreError::TtlOverflow(ttl))
}

/// Store statistics.
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    /// Number of indexed elements (including expired, unreaped ones)
    pub keys: usize,
    /// Number of keys carrying a TTL
    pub keys_with_ttl: usize,
    /// Levels currently in use by the index
    pub levels: usize,
    /// Total GET operations
    pub get_ops: u64,
    /// Total SET operations
    pub set_ops: u64,
    /// Total DEL operations
    pub del_ops: u64,
    /// Expired keys removed on access
    pub lazy_expired: u64,
    /// Expired keys removed by a sweep
    pub reaped: u64,
}

//! # SkipKV - A Concurrent Skip List Key-Value Store
//!
//! SkipKV is an embeddable, in-memory ordered map from byte-string keys to
//! byte-string values, indexed by a skip list, with per-key time-to-live.
//!
//! ## Features
//!
//! - **Skip List Index**: O(log n) expected insert, delete and lookup
//! - **Thread Safe**: one `RwLock` over the index, one over the TTL table
//! - **TTL Support**: keys can expire, with lazy and active expiry
//! - **Prefix Scans**: optional key-ordered scoring for seekable scans
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              SkipKV                                     │
//! │                                                                         │
//! │   caller ──► SkipListStore ──► ScoreMode ──► SkipList                   │
//! │                   │             (FNV-1a or      (arena of elements,     │
//! │                   │              key prefix)     index links)           │
//! │                   ▼                                                     │
//! │              TTL table ◄──────────────┐                                 │
//! │                                       │                                 │
//! │                     ┌─────────────────┴───────────────────────────────┐ │
//! │                     │               Reaper                            │ │
//! │                     │      (Background Tokio Task)                    │ │
//! │                     └─────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use skipkv::{SkipListStore, StoreConfig};
//! use bytes::Bytes;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> skipkv::Result<()> {
//!     let store = SkipListStore::open(StoreConfig::default())?;
//!
//!     store.set(Bytes::from("user:1"), Bytes::from("alice"));
//!     store.set_with_ttl(Bytes::from("user:2"), Bytes::from("bob"), Duration::from_secs(30))?;
//!
//!     assert_eq!(store.get(b"user:1"), Some(Bytes::from("alice")));
//!     assert_eq!(store.scan(b"user:", 0).len(), 2);
//!
//!     store.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Lazy + Active Expiry
//!
//! Keys with TTL are expired in two ways:
//! 1. **Lazy**: `get` checks the deadline and drops the key when it has passed
//! 2. **Active**: a background task periodically evicts expired keys
//!
//! By default the lazy delete runs on a spawned task, so `get` may report a
//! key missing while [`SkipListStore::len`] still counts it for a moment.
//! Set [`LazyExpiry::Inline`] to delete before `get` returns.
//!
//! ## Module Overview
//!
//! - [`storage`]: skip list engine, store and reaper
//! - [`config`]: store configuration
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{LazyExpiry, StoreConfig};
pub use error::{Result, StoreError};
pub use storage::{Element, Score, ScoreMode, SkipList, SkipListStore, StoreStats};

/// Version of SkipKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

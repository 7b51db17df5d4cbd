//! Storage Module
//!
//! This module provides the core storage functionality for SkipKV: a skip
//! list index, the key-value store built on it and the background reaper
//! that evicts expired keys.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SkipListStore                           │
//! │   key ──► ScoreMode ──► (score, key)                        │
//! │  ┌──────────────────────────┐  ┌─────────────────────────┐  │
//! │  │ SkipList (RwLock)        │  │ TTL table (RwLock)      │  │
//! │  └──────────────────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │
//!              ┌─────────────┴─────────────┐
//!              │         Reaper            │
//!              │  (Background Tokio Task)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use skipkv::storage::SkipListStore;
//! use bytes::Bytes;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> skipkv::Result<()> {
//! let store = SkipListStore::new()?;
//!
//! // Basic operations
//! store.set(Bytes::from("name"), Bytes::from("Ariz"));
//! assert_eq!(store.get(b"name"), Some(Bytes::from("Ariz")));
//!
//! // Set with TTL
//! store.set_with_ttl(
//!     Bytes::from("session"),
//!     Bytes::from("token123"),
//!     Duration::from_secs(3600),
//! )?;
//! # Ok(())
//! # }
//! ```

mod reaper;
pub mod score;
pub mod skiplist;
pub mod store;

// Re-export commonly used types
pub use score::{Score, ScoreMode};
pub use skiplist::{Element, Iter, SkipList};
pub use store::{SkipListStore, StoreStats};

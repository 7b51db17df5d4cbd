//! Background TTL Reaper
//!
//! This module implements the task that periodically evicts expired keys.
//! This is called "active expiry" as opposed to the "lazy expiry" that `get`
//! performs on access.
//!
//! ## Why Do We Need This?
//!
//! Lazy expiry only catches keys that are read again. A key that expires and
//! is never touched would stay indexed forever without a sweep.
//!
//! ## Design
//!
//! The reaper runs as a Tokio task and:
//! 1. Sleeps for the configured interval (default: 1s)
//! 2. Collects expired keys under the TTL read lock, then releases it
//! 3. Evicts each key through the store's delete path
//! 4. Logs how many keys it removed
//!
//! Step 2 never holds the TTL lock while evicting, since eviction takes that
//! lock again for writing.

use super::store::StoreCore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// A handle to the running reaper.
///
/// Stopping is one-shot: the first [`stop`](Reaper::stop) signals the task,
/// later calls do nothing. Dropping the handle stops the reaper.
#[derive(Debug)]
pub(crate) struct Reaper {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,
    stopped: AtomicBool,
}

impl Reaper {
    /// Spawns the reaper on `runtime`, sweeping `core` every `interval`.
    pub(crate) fn start(core: Arc<StoreCore>, interval: Duration, runtime: &Handle) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        runtime.spawn(reaper_loop(core, interval, shutdown_rx));

        info!(interval_ms = interval.as_millis() as u64, "TTL reaper started");

        Self {
            shutdown_tx,
            stopped: AtomicBool::new(false),
        }
    }

    /// Stops the reaper. Returns `true` only for the call that stopped it.
    pub(crate) fn stop(&self) -> bool {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return false;
        }
        // the task may already be gone if its runtime shut down
        let _ = self.shutdown_tx.send(true);
        info!("TTL reaper stopped");
        true
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main reaper loop.
async fn reaper_loop(
    core: Arc<StoreCore>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        // Wait for the interval or shutdown signal
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("TTL reaper received shutdown signal");
                    return;
                }
            }
        }

        let reaped = core.remove_expired();

        if reaped > 0 {
            debug!(
                reaped = reaped,
                keys_remaining = core.len(),
                "Expired keys reaped"
            );
        } else {
            trace!("Reaper tick found no expired keys");
        }
    }
}

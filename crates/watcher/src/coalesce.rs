//! Pending change set with a blocking, bounded drain
//!
//! The producer thread inserts accepted paths and raises the signal; the
//! consumer drains everything at once. Duplicates collapse on insert, so a
//! hot file costs one entry however long nobody drains.

use parking_lot::{Condvar, Mutex};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Settle window used unless a session is configured otherwise
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(20);

#[derive(Default)]
struct PendingChanges {
    paths: HashSet<PathBuf>,
    /// Set on record, cleared on drain
    signaled: bool,
}

/// Thread-safe buffer of accepted paths awaiting delivery
pub struct ChangeAccumulator {
    pending: Mutex<PendingChanges>,
    ready: Condvar,
    /// How long a woken drain keeps collecting before snapshotting
    settle: Duration,
}

impl Default for ChangeAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeAccumulator {
    pub fn new() -> Self {
        Self::with_settle(Duration::ZERO)
    }

    /// Create an accumulator whose drains wait `settle` after the first change
    ///
    /// Paired native events (rename source and destination) then land in the
    /// same drain. The wait never extends past the drain's own deadline.
    pub fn with_settle(settle: Duration) -> Self {
        Self {
            pending: Mutex::new(PendingChanges::default()),
            ready: Condvar::new(),
            settle,
        }
    }

    /// Insert a path and wake any blocked drain
    pub fn record(&self, path: PathBuf) {
        let mut pending = self.pending.lock();
        pending.paths.insert(path);
        pending.signaled = true;
        drop(pending);

        self.ready.notify_all();
    }

    /// Wait up to `timeout` for changes, then take everything pending
    ///
    /// A zero timeout returns immediately. An empty set on timeout is normal.
    pub fn drain(&self, timeout: Duration) -> HashSet<PathBuf> {
        let deadline = Instant::now().checked_add(timeout);
        let mut pending = self.pending.lock();

        while !pending.signaled {
            match deadline {
                Some(deadline) => {
                    if self.ready.wait_until(&mut pending, deadline).timed_out() {
                        break;
                    }
                }
                None => self.ready.wait(&mut pending),
            }
        }

        if pending.signaled && !self.settle.is_zero() {
            let settle_until = Instant::now() + self.settle;
            let settle_until = deadline.map_or(settle_until, |d| d.min(settle_until));
            while Instant::now() < settle_until {
                self.ready.wait_until(&mut pending, settle_until);
            }
        }

        pending.signaled = false;
        std::mem::take(&mut pending.paths)
    }

    /// Whether a drain would return without waiting
    pub fn has_changes(&self) -> bool {
        self.pending.lock().signaled
    }

    /// Number of distinct paths awaiting a drain
    pub fn pending_len(&self) -> usize {
        self.pending.lock().paths.len()
    }
}

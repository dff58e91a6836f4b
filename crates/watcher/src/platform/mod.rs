//! Native event sources
//!
//! The session drives an [`EventSource`]; any backend that pushes
//! [`RawEvent`]s into the sink is substitutable. The default is
//! [`NotifySource`], wrapping the platform's recommended notify backend
//! (inotify, FSEvents, kqueue, ReadDirectoryChangesW).

mod native;

pub use native::NotifySource;

use crossbeam_channel::Sender;
use notify::{Config, Event, RecommendedWatcher, Watcher, WatcherKind};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::debug;

use crate::normalize::RawEvent;
use crate::Result;

/// Where a source delivers raw events
pub type EventSink = Sender<RawEvent>;

/// A native filesystem notification facility
pub trait EventSource: Send {
    /// Begin delivering events for `roots` (recursively) into `sink`
    fn start(&mut self, roots: &[PathBuf], sink: EventSink) -> Result<()>;

    /// Stop delivering and release native resources
    ///
    /// Must be idempotent. Failures are logged, never returned.
    fn stop(&mut self);
}

static AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Report whether a native (non-polling) backend works on this platform
///
/// Probed once per process. Callers should fall back to a polling watcher
/// when this returns false.
pub fn is_available() -> bool {
    *AVAILABLE.get_or_init(probe)
}

/// The kind of backend notify selects on this platform
pub fn native_kind() -> WatcherKind {
    <RecommendedWatcher as Watcher>::kind()
}

fn probe() -> bool {
    let kind = native_kind();
    if matches!(kind, WatcherKind::PollWatcher | WatcherKind::NullWatcher) {
        debug!("Recommended backend {:?} is not native", kind);
        return false;
    }

    match RecommendedWatcher::new(|_: notify::Result<Event>| {}, Config::default()) {
        Ok(_) => true,
        Err(e) => {
            debug!("Native backend {:?} unavailable: {}", kind, e);
            false
        }
    }
}

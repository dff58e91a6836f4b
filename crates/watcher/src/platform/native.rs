//! notify-backed event source

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use tracing::{debug, warn};

use super::{EventSink, EventSource};
use crate::normalize::RawEvent;
use crate::Result;

/// Event source backed by `notify::RecommendedWatcher`
#[derive(Default)]
pub struct NotifySource {
    watcher: Option<RecommendedWatcher>,
    roots: Vec<PathBuf>,
}

impl NotifySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }
}

impl EventSource for NotifySource {
    fn start(&mut self, roots: &[PathBuf], sink: EventSink) -> Result<()> {
        let handler = move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if event.need_rescan() {
                    warn!("Native event queue overflowed; some changes may be merged or missed");
                }
                for raw in RawEvent::from_notify(event) {
                    // Receiver gone means the session is shutting down
                    if sink.send(raw).is_err() {
                        break;
                    }
                }
            }
            Err(e) => warn!("Native event source error: {}", e),
        };

        let mut watcher = RecommendedWatcher::new(handler, Config::default())?;
        for root in roots {
            watcher.watch(root, RecursiveMode::Recursive)?;
            debug!("Scheduled {}", root.display());
        }

        self.roots = roots.to_vec();
        self.watcher = Some(watcher);
        Ok(())
    }

    fn stop(&mut self) {
        let Some(mut watcher) = self.watcher.take() else {
            return;
        };

        for root in self.roots.drain(..) {
            if let Err(e) = watcher.unwatch(&root) {
                // Root removed while watched; nothing left to release
                debug!("Unschedule {} failed: {}", root.display(), e);
            }
        }
        // Dropping the watcher shuts down its delivery thread
        drop(watcher);
    }
}

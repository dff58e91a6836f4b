//! Watch session lifecycle
//!
//! `Inert → Active → Stopped`. A session owns its roots, the suppression
//! rules, the change accumulator and the native source. Once started, a
//! dedicated producer thread receives raw events from the source over a
//! bounded channel, filters them and records the survivors.

use crossbeam_channel::{bounded, select, Receiver, Sender};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::coalesce::{ChangeAccumulator, DEFAULT_SETTLE};
use crate::config::WatchConfig;
use crate::filter::EventFilter;
use crate::ignore::{compile_pattern, SuppressionRules};
use crate::normalize::RawEvent;
use crate::platform::{self, EventSource, NotifySource};
use crate::{Result, WatchError};

/// Lifecycle state of a [`WatchSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, not observing
    Inert,
    /// Native source running, events flowing
    Active,
    /// Terminal
    Stopped,
}

struct Producer {
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

/// Filtered, deduplicated change notifications for a set of directories
pub struct WatchSession<S: EventSource = NotifySource> {
    roots: Vec<PathBuf>,
    rules: Arc<SuppressionRules>,
    changes: Arc<ChangeAccumulator>,
    source: S,
    state: SessionState,
    channel_capacity: usize,
    producer: Option<Producer>,
}

impl WatchSession<NotifySource> {
    /// Create an inert session over the platform's native backend
    pub fn new<I, P>(directories: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::with_source(directories, NotifySource::new())
    }

    /// Create an inert session from a validated configuration
    pub fn from_config(config: &WatchConfig) -> Result<Self> {
        config.validate()?;

        let session = Self::new(&config.directories)?
            .with_settle(config.settle())
            .with_channel_capacity(config.channel_capacity);
        session.set_skip_files_pattern(config.skip_files.as_deref())?;
        session.set_watcher_ignore_pattern(config.watcher_ignore.as_deref())?;
        session.set_ignore_editor_temp(config.ignore_editor_temp);
        Ok(session)
    }

    /// Whether a native backend is present; see [`platform::is_available`]
    pub fn is_available() -> bool {
        platform::is_available()
    }
}

impl<S: EventSource> WatchSession<S> {
    /// Create an inert session driving a custom event source
    ///
    /// Every directory must exist; roots are stored canonicalized.
    pub fn with_source<I, P>(directories: I, source: S) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let roots = directories
            .into_iter()
            .map(|dir| canonical_root(dir.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        info!("Watch session created for {:?}", roots);

        Ok(Self {
            roots,
            rules: Arc::new(SuppressionRules::new()),
            changes: Arc::new(ChangeAccumulator::with_settle(DEFAULT_SETTLE)),
            source,
            state: SessionState::Inert,
            channel_capacity: 1024,
            producer: None,
        })
    }

    /// Set how long a woken drain keeps collecting (default 20ms)
    ///
    /// Only meaningful before `start`; anything already pending is discarded.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.changes = Arc::new(ChangeAccumulator::with_settle(settle));
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn set_skip_rule(&self, rule: Option<Regex>) {
        self.rules.set_skip(rule);
    }

    pub fn set_ignore_rule(&self, rule: Option<Regex>) {
        self.rules.set_ignore(rule);
    }

    /// Compile and install the skip rule; `None` clears it
    ///
    /// Patterns are matched relative to the changed file's own directory.
    pub fn set_skip_files_pattern(&self, pattern: Option<&str>) -> Result<()> {
        self.set_skip_rule(compile_pattern(pattern)?);
        Ok(())
    }

    /// Compile and install the user override rule; `None` clears it
    pub fn set_watcher_ignore_pattern(&self, pattern: Option<&str>) -> Result<()> {
        self.set_ignore_rule(compile_pattern(pattern)?);
        Ok(())
    }

    pub fn set_ignore_editor_temp(&self, enabled: bool) {
        self.rules.set_editor_temp(enabled);
    }

    /// Check a single path against the current file-level rules
    pub fn is_path_ignored(&self, path: &Path) -> bool {
        self.rules.snapshot().ignores_file(path)
    }

    /// Start the native source and the producer thread
    pub fn start(&mut self) -> Result<()> {
        if self.state != SessionState::Inert {
            return Err(WatchError::InvalidState {
                expected: SessionState::Inert,
                actual: self.state,
            });
        }

        let (event_tx, event_rx) = bounded(self.channel_capacity);
        let (shutdown_tx, shutdown_rx) = bounded(1);
        let filter = EventFilter::new(self.roots.clone(), Arc::clone(&self.rules));
        let changes = Arc::clone(&self.changes);

        let handle = thread::Builder::new()
            .name("devwatch-producer".into())
            .spawn(move || run_producer(filter, changes, event_rx, shutdown_rx))?;

        // On failure the sink is dropped with the source's handler, which ends
        // the producer loop
        if let Err(e) = self.source.start(&self.roots, event_tx) {
            drop(shutdown_tx);
            if handle.join().is_err() {
                warn!("Producer thread panicked");
            }
            return Err(e);
        }

        self.producer = Some(Producer {
            shutdown: shutdown_tx,
            handle,
        });
        self.state = SessionState::Active;
        info!("Watch session started ({} roots)", self.roots.len());
        Ok(())
    }

    /// Take every change recorded since the last drain
    ///
    /// Blocks up to `timeout` if nothing is pending yet.
    pub fn drain(&self, timeout: Duration) -> HashSet<PathBuf> {
        self.changes.drain(timeout)
    }

    /// [`drain`](Self::drain) with a millisecond timeout
    pub fn changes(&self, timeout_ms: u64) -> HashSet<PathBuf> {
        self.drain(Duration::from_millis(timeout_ms))
    }

    /// Stop observing and release the native source
    ///
    /// A no-op unless the session is active. Returns after the producer
    /// thread has exited.
    pub fn quit(&mut self) {
        if self.state != SessionState::Active {
            return;
        }

        self.source.stop();

        if let Some(producer) = self.producer.take() {
            let _ = producer.shutdown.send(());
            if producer.handle.join().is_err() {
                warn!("Producer thread panicked");
            }
        }

        self.state = SessionState::Stopped;
        info!("Watch session stopped for {:?}", self.roots);
    }
}

impl<S: EventSource> Drop for WatchSession<S> {
    fn drop(&mut self) {
        self.quit();
    }
}

fn canonical_root(dir: &Path) -> Result<PathBuf> {
    let root = dir.canonicalize().map_err(|source| WatchError::InvalidRoot {
        path: dir.to_path_buf(),
        source,
    })?;

    if !root.is_dir() {
        return Err(WatchError::InvalidRoot {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
        });
    }
    Ok(root)
}

fn run_producer(
    filter: EventFilter,
    changes: Arc<ChangeAccumulator>,
    events: Receiver<RawEvent>,
    shutdown: Receiver<()>,
) {
    let deliver = |event: RawEvent| {
        if let Some(path) = filter.accept(event) {
            changes.record(path);
        }
    };

    loop {
        select! {
            recv(events) -> msg => match msg {
                Ok(event) => deliver(event),
                Err(_) => break,
            },
            recv(shutdown) -> _ => {
                // Source is stopped; flush what it already queued
                for event in events.try_iter() {
                    deliver(event);
                }
                break;
            }
        }
    }

    debug!("Producer thread exiting");
}

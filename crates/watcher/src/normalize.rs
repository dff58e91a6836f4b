//! Raw native events and their resolution against watched roots

use notify::event::{AccessKind, AccessMode, ModifyKind};
use notify::EventKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What the native source said happened to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFlag {
    /// No real change (reads, opens, bookkeeping notices)
    None,
    Created,
    Modified,
    Removed,
    Renamed,
    /// The backend could not classify the change
    Unknown,
}

impl EventFlag {
    /// Whether this flag carries no information and must not surface
    pub fn is_none(self) -> bool {
        self == EventFlag::None
    }
}

impl From<&EventKind> for EventFlag {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => EventFlag::Created,
            EventKind::Modify(ModifyKind::Name(_)) => EventFlag::Renamed,
            EventKind::Modify(_) => EventFlag::Modified,
            EventKind::Remove(_) => EventFlag::Removed,
            // A writer closing the file is the only access that implies content
            EventKind::Access(AccessKind::Close(AccessMode::Write)) => EventFlag::Modified,
            EventKind::Access(_) | EventKind::Other => EventFlag::None,
            EventKind::Any => EventFlag::Unknown,
        }
    }
}

/// A single (path, flag) notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub flag: EventFlag,
}

impl RawEvent {
    pub fn new(path: impl Into<PathBuf>, flag: EventFlag) -> Self {
        Self {
            path: path.into(),
            flag,
        }
    }

    /// Fan a notify event out into one raw event per path
    ///
    /// Renames carrying both source and destination produce two events.
    pub fn from_notify(event: notify::Event) -> Vec<RawEvent> {
        let flag = EventFlag::from(&event.kind);
        event
            .paths
            .into_iter()
            .map(|path| RawEvent { path, flag })
            .collect()
    }
}

/// An event resolved to the root it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEvent<'a> {
    /// Watched root containing the change
    pub root: &'a Path,
    /// Absolute path of the change
    pub path: PathBuf,
    /// Path relative to `root`
    pub relative: PathBuf,
    pub flag: EventFlag,
}

impl ResolvedEvent<'_> {
    /// Root-relative directory holding the changed entry
    pub fn relative_dir(&self) -> &Path {
        self.relative.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Resolves raw events to watched roots and drops no-op events
#[derive(Debug, Clone)]
pub struct Normalizer {
    roots: Vec<PathBuf>,
}

impl Normalizer {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolve an event to the first root containing it
    ///
    /// Returns `None` for null-flag events and for paths outside every root.
    pub fn resolve(&self, event: RawEvent) -> Option<ResolvedEvent<'_>> {
        if event.flag.is_none() {
            return None;
        }

        // Component-wise containment: /a/bc is not under /a/b
        for root in &self.roots {
            if let Ok(relative) = event.path.strip_prefix(root) {
                return Some(ResolvedEvent {
                    root,
                    relative: relative.to_path_buf(),
                    path: event.path,
                    flag: event.flag,
                });
            }
        }

        debug!("Dropping event outside watched roots: {}", event.path.display());
        None
    }
}

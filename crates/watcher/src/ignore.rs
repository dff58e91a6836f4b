//! Suppression rules for the watch pipeline
//!
//! Two independent, optional regular expressions decide whether a change is
//! reported:
//! 1. `skip_files` - files the host never reloads for
//! 2. `watcher_ignore` - a user-configurable override
//!
//! Both are matched against the path relative to its own enclosing directory
//! (the final component). Either may be unset. Rules are swapped atomically so
//! the delivery thread never blocks on a setter.

use arc_swap::ArcSwapOption;
use regex::Regex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::Result;

/// Check whether a changed path is suppressed by either rule
///
/// Returns false when neither rule is set. Matching is an unanchored search,
/// so anchoring is whatever the caller wrote into the pattern.
pub fn is_path_ignored(path: &Path, skip: Option<&Regex>, ignore: Option<&Regex>) -> bool {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => return false,
    };

    matches_rule(skip, &name) || matches_rule(ignore, &name)
}

pub(crate) fn matches_rule(rule: Option<&Regex>, target: &str) -> bool {
    rule.map_or(false, |re| re.is_match(target))
}

/// Compile an optional pattern source into a rule
pub fn compile_pattern(pattern: Option<&str>) -> Result<Option<Regex>> {
    Ok(pattern.map(Regex::new).transpose()?)
}

/// Check if path is a common editor temporary or system file
///
/// Covers: Vim, Emacs, MacOS system files, Python bytecode
pub fn is_editor_temp(path: &Path) -> bool {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    // Vim swap files
    if filename.ends_with(".swp") || filename.ends_with(".swo") {
        return true;
    }

    // Vim/Emacs backup files (~)
    if filename.ends_with('~') {
        return true;
    }

    // Emacs auto-save (#*#) and lock files (.#*)
    if (filename.len() > 1 && filename.starts_with('#') && filename.ends_with('#'))
        || filename.starts_with(".#")
    {
        return true;
    }

    filename == ".DS_Store" || filename.ends_with(".pyc")
}

/// The live rule set shared between a session and its delivery thread
#[derive(Default)]
pub struct SuppressionRules {
    skip: ArcSwapOption<Regex>,
    ignore: ArcSwapOption<Regex>,
    editor_temp: AtomicBool,
}

impl SuppressionRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the skip rule (`None` clears it)
    pub fn set_skip(&self, rule: Option<Regex>) {
        debug!("skip_files rule set to {:?}", rule.as_ref().map(Regex::as_str));
        self.skip.store(rule.map(Arc::new));
    }

    /// Replace the watcher-ignore rule (`None` clears it)
    pub fn set_ignore(&self, rule: Option<Regex>) {
        debug!("watcher_ignore rule set to {:?}", rule.as_ref().map(Regex::as_str));
        self.ignore.store(rule.map(Arc::new));
    }

    pub fn set_editor_temp(&self, enabled: bool) {
        self.editor_temp.store(enabled, Ordering::Relaxed);
    }

    /// Load the rules that apply to the next event
    pub fn snapshot(&self) -> RuleSnapshot {
        RuleSnapshot {
            skip: self.skip.load_full(),
            ignore: self.ignore.load_full(),
            editor_temp: self.editor_temp.load(Ordering::Relaxed),
        }
    }
}

/// Rules as loaded for a single event
#[derive(Clone, Default)]
pub struct RuleSnapshot {
    skip: Option<Arc<Regex>>,
    ignore: Option<Arc<Regex>>,
    editor_temp: bool,
}

impl RuleSnapshot {
    pub fn skip(&self) -> Option<&Regex> {
        self.skip.as_deref()
    }

    pub fn ignore(&self) -> Option<&Regex> {
        self.ignore.as_deref()
    }

    /// Full file-level check: both rules plus the optional editor filter
    pub fn ignores_file(&self, path: &Path) -> bool {
        is_path_ignored(path, self.skip(), self.ignore())
            || (self.editor_temp && is_editor_temp(path))
    }
}

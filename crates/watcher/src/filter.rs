//! The per-event filter pipeline
//!
//! Runs on the producer thread, before the accumulator lock is taken:
//! resolve → file-level rules → ancestor walk.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::ancestry::is_subtree_ignored;
use crate::ignore::SuppressionRules;
use crate::normalize::{Normalizer, RawEvent};

pub struct EventFilter {
    normalizer: Normalizer,
    rules: Arc<SuppressionRules>,
}

impl EventFilter {
    pub fn new(roots: Vec<PathBuf>, rules: Arc<SuppressionRules>) -> Self {
        Self {
            normalizer: Normalizer::new(roots),
            rules,
        }
    }

    /// Decide whether an event is reported, returning its absolute path
    pub fn accept(&self, event: RawEvent) -> Option<PathBuf> {
        let resolved = self.normalizer.resolve(event)?;
        let rules = self.rules.snapshot();

        if rules.ignores_file(&resolved.path) {
            debug!("Ignoring change in {}", resolved.path.display());
            return None;
        }

        match is_subtree_ignored(resolved.relative_dir(), rules.skip(), rules.ignore()) {
            Ok(false) => {}
            Ok(true) => {
                debug!("Ignoring change under suppressed directory: {}", resolved.path.display());
                return None;
            }
            Err(e) => {
                warn!("Dropping event for {}: {}", resolved.path.display(), e);
                return None;
            }
        }

        trace!("Accepted {:?} for {}", resolved.flag, resolved.path.display());
        Some(resolved.path)
    }
}

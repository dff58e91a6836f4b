//! Transitive directory suppression
//!
//! The native source reports every change on its own, so a file deep inside
//! an ignored directory arrives without any hint that its ancestor is ignored.
//! Walking the root-relative ancestry of each change restores that.

use regex::Regex;
use std::path::Path;

use crate::ignore::matches_rule;
use crate::{Result, WatchError};

/// Check whether any ancestor directory of a change is suppressed
///
/// `relative_dir` is the directory containing the changed entry, relative to
/// its watched root. Each prefix (`a/b/c`, `a/b`, `a`) is tested against both
/// rules. The empty path is the root itself and never matches.
///
/// Absolute input is rejected before walking.
pub fn is_subtree_ignored(
    relative_dir: &Path,
    skip: Option<&Regex>,
    ignore: Option<&Regex>,
) -> Result<bool> {
    if relative_dir.is_absolute() || relative_dir.has_root() {
        return Err(WatchError::AbsoluteAncestry(relative_dir.to_path_buf()));
    }

    let mut current = Some(relative_dir);
    while let Some(dir) = current {
        if dir.file_name().is_none() {
            break;
        }

        let joined = dir.to_string_lossy();
        if matches_rule(skip, &joined) || matches_rule(ignore, &joined) {
            return Ok(true);
        }

        current = dir.parent();
    }

    Ok(false)
}

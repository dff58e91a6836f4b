//! Filesystem change notification for hot-reloading development servers
//!
//! This crate sits between a native filesystem event source and a host that
//! polls for changes:
//! - Per-file and transitive per-directory suppression rules
//! - Normalization of raw native events against watched roots
//! - Change coalescing with a blocking, bounded drain
//! - Multiple watched roots per session
//!
//! ```no_run
//! use devwatch_watcher::WatchSession;
//! use std::time::Duration;
//!
//! # fn main() -> devwatch_watcher::Result<()> {
//! if !WatchSession::is_available() {
//!     // fall back to a polling watcher
//!     return Ok(());
//! }
//!
//! let mut session = WatchSession::new(["./app"])?;
//! session.set_skip_files_pattern(Some(r"^(.*/)?\..*"))?;
//! session.start()?;
//!
//! for path in session.drain(Duration::from_millis(100)) {
//!     println!("changed: {}", path.display());
//! }
//! session.quit();
//! # Ok(())
//! # }
//! ```

pub mod ancestry;
pub mod coalesce;
pub mod config;
pub mod error;
pub mod filter;
pub mod ignore;
pub mod normalize;
pub mod platform;
pub mod session;

// Re-exports
pub use ancestry::is_subtree_ignored;
pub use coalesce::ChangeAccumulator;
pub use config::WatchConfig;
pub use error::{Result, WatchError};
pub use ignore::{is_path_ignored, SuppressionRules};
pub use normalize::{EventFlag, RawEvent};
pub use platform::{is_available, EventSink, EventSource, NotifySource};
pub use session::{SessionState, WatchSession};

//! Report native backend availability

use anyhow::Result;
use owo_colors::OwoColorize;
use watcher::{platform, WatchSession};

pub async fn run() -> Result<()> {
    let kind = platform::native_kind();

    if WatchSession::is_available() {
        println!("{} Native backend available ({:?})", "✓".green(), kind);
    } else {
        println!("{} No native backend ({:?})", "✗".yellow(), kind);
        println!("  {}", "Tip: fall back to a polling watcher on this platform".dimmed());
    }

    Ok(())
}

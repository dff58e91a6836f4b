//! Configuration file commands

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use watcher::WatchConfig;

/// Print an example configuration
pub async fn run_example() -> Result<()> {
    print!("{}", WatchConfig::example());
    Ok(())
}

/// Validate a configuration file and show the effective values
pub async fn run_check(path: &Path) -> Result<()> {
    let config = WatchConfig::load(path)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    println!("{} {}", "✓".green(), path.display());
    println!("{}", "[watch]".yellow());
    for dir in &config.directories {
        println!("  {} = {}", "directory".cyan(), dir.display());
    }
    println!(
        "  {} = {}",
        "skip_files".cyan(),
        config.skip_files.as_deref().unwrap_or("(none)")
    );
    println!(
        "  {} = {}",
        "watcher_ignore".cyan(),
        config.watcher_ignore.as_deref().unwrap_or("(none)")
    );
    println!("  {} = {}", "ignore_editor_temp".cyan(), config.ignore_editor_temp);
    println!(
        "  {} = {} {}",
        "settle_ms".cyan(),
        config.settle_ms,
        format!("({}ms)", config.settle_ms).dimmed()
    );
    println!("  {} = {}", "channel_capacity".cyan(), config.channel_capacity);

    Ok(())
}

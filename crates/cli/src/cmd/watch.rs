//! Watch directories and print changes until Ctrl-C

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use watcher::{WatchConfig, WatchSession};

const DEFAULT_INTERVAL_MS: u64 = 500;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Directories to watch (default: current directory)
    pub dirs: Vec<PathBuf>,

    /// Load settings from a TOML file; flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Regex for files never reloaded for
    #[arg(long)]
    pub skip_files: Option<String>,

    /// Extra user override regex
    #[arg(long)]
    pub ignore: Option<String>,

    /// Suppress editor swap/backup files
    #[arg(long)]
    pub ignore_editor_temp: bool,

    /// Drain timeout per poll in milliseconds (at least 1)
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Settle window after the first change in milliseconds
    #[arg(long)]
    pub settle_ms: Option<u64>,
}

impl Default for WatchArgs {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            config: None,
            skip_files: None,
            ignore: None,
            ignore_editor_temp: false,
            interval_ms: DEFAULT_INTERVAL_MS,
            settle_ms: None,
        }
    }
}

pub async fn run(args: WatchArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    if !WatchSession::is_available() {
        anyhow::bail!("No native filesystem event backend on this platform; use a polling watcher instead");
    }

    let mut session = WatchSession::from_config(&config)
        .context("Failed to create watch session")?;
    session.start().context("Failed to start watching")?;

    for root in session.roots() {
        println!("{} {}", "Watching".bold(), root.display().to_string().cyan());
    }

    let stop = Arc::new(AtomicBool::new(false));
    let interval = Duration::from_millis(args.interval_ms);

    // drain() blocks, so poll on a blocking thread and check the flag between polls
    let poller = {
        let stop = Arc::clone(&stop);
        tokio::task::spawn_blocking(move || {
            while !stop.load(Ordering::Relaxed) {
                let mut changed: Vec<_> = session.drain(interval).into_iter().collect();
                if changed.is_empty() {
                    continue;
                }
                changed.sort();
                for path in &changed {
                    println!("{} {}", "changed".green(), path.display());
                }
            }
            session.quit();
        })
    };

    let interrupted = tokio::signal::ctrl_c().await;
    stop.store(true, Ordering::Relaxed);
    poller.await.context("Watch loop panicked")?;

    interrupted.context("Failed to listen for Ctrl-C")?;
    info!("Interrupted, watch session stopped");
    Ok(())
}

/// Merge an optional config file with command-line flags
fn resolve_config(args: &WatchArgs) -> Result<WatchConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            WatchConfig::from_toml_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => WatchConfig::default(),
    };

    if !args.dirs.is_empty() {
        config.directories = args.dirs.clone();
    }
    if config.directories.is_empty() {
        config
            .directories
            .push(std::env::current_dir().context("Failed to get current directory")?);
    }
    if args.skip_files.is_some() {
        config.skip_files = args.skip_files.clone();
    }
    if args.ignore.is_some() {
        config.watcher_ignore = args.ignore.clone();
    }
    if args.ignore_editor_temp {
        config.ignore_editor_temp = true;
    }
    if args.interval_ms == 0 {
        anyhow::bail!("--interval-ms must be at least 1");
    }
    if let Some(settle_ms) = args.settle_ms {
        config.settle_ms = settle_ms;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

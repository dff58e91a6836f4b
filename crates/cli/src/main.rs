//! devwatch CLI - watch directories and print reload-worthy changes

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod cmd;

/// devwatch - filtered filesystem change notifications for dev servers
#[derive(Parser)]
#[command(name = "devwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch directories and print changed paths
    Watch(cmd::watch::WatchArgs),
    /// Report whether a native event backend is available
    Probe,
    /// Inspect configuration files
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print an example configuration
    Example,
    /// Validate a configuration file
    Check {
        /// Path to the TOML file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Guard must live until exit so buffered log lines are flushed
    let _guard = init_tracing(cli.log_file.as_deref())?;

    match cli.command {
        Commands::Watch(args) => cmd::watch::run(args).await,
        Commands::Probe => cmd::probe::run().await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Example => cmd::config::run_example().await,
            ConfigCommands::Check { path } => cmd::config::run_check(&path).await,
        },
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .context("Log file path has no file name")?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}

//! harp CLI - drives harp components from the outside.
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`HARP_*`)
//! 3. Explicit file (`--config PATH`)
//! 4. Project config (`.harp/config.toml` in current directory)
//! 5. Global config (`~/.harp/config.toml`)
//! 6. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `HARP_DEBUG`: Enable debug logging (`true`/`false`)
//! - `HARP_QUEUE_CAPACITY`: Per-component queue bound (`0` = unbounded)
//! - `HARP_LOG_LEVEL`: Log filter used when `RUST_LOG` is unset

mod demo;
mod worker;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use harp_runtime::config::{ConfigLoader, RuntimeConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// harp - message-driven component runtime
#[derive(Parser, Debug)]
#[command(name = "harp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Explicit config file, layered over global and project config
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the two-component demo scenario
    Demo {
        /// Bound every component queue (overrides queue.capacity)
        #[arg(long)]
        capacity: Option<usize>,
    },
    /// Print the resolved configuration as TOML
    Config,
}

fn resolve_config(args: &Args) -> Result<RuntimeConfig> {
    let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut loader = ConfigLoader::new().with_project_root(&project_root);
    if let Some(ref path) = args.config {
        loader = loader.with_config_file(path);
    }

    let mut config = loader.load().context("Config error")?;

    // CLI args override (highest priority)
    if args.debug {
        config.debug = true;
    }
    if let Command::Demo {
        capacity: Some(capacity),
    } = args.command
    {
        config.queue.capacity = (capacity > 0).then_some(capacity);
    }
    Ok(config)
}

/// Terminal filter: --debug > --verbose > RUST_LOG > `logging.level`.
fn terminal_filter(args: &Args, config: &RuntimeConfig) -> EnvFilter {
    if args.debug || config.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    // stdout carries command output; logs go to stderr
    let terminal_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(terminal_layer.with_filter(terminal_filter(&args, &config)))
        .init();

    info!(
        debug = config.debug,
        capacity = ?config.queue.capacity,
        level = %config.logging.level,
        "Configuration resolved"
    );

    match args.command {
        Command::Demo { .. } => {
            let value = demo::run(config.queue.capacity).await?;
            println!("final B.x = {value}");
        }
        Command::Config => {
            print!("{}", config.to_toml().context("serialize config")?);
        }
    }

    Ok(())
}

//! permwebhook - relays permission events to Discord webhooks.
//!
//! Reads newline-delimited JSON permission events from stdin and hands them to
//! the notifier until stdin closes.

use anyhow::Context;
use clap::Parser;
use permwebhook::{process_event, Activation, Config, EventBus, Notifier};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "permwebhook")]
#[command(author, version, about)]
#[command(about = "Relays permission-change events to Discord webhooks")]
struct Cli {
    /// Path to the configuration file (overrides the default location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Write the default configuration file and exit
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config_path = cli.config.clone().unwrap_or_else(resolve_config_path);

    if cli.init {
        match Config::save_default(&config_path) {
            Ok(true) => info!("Wrote default configuration to {}", config_path.display()),
            Ok(false) => info!("Configuration already exists at {}", config_path.display()),
            Err(e) => {
                error!("Failed to write default configuration: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = run(&config_path).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(config_path: &Path) -> anyhow::Result<()> {
    if Config::save_default(config_path)
        .with_context(|| format!("Failed to write default config to {:?}", config_path))?
    {
        info!("Created default configuration at {}", config_path.display());
    }

    // A broken config disables the notifier; it is not a process failure.
    let config = match Config::load(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Failed to load config from {:?}: {}. Disabling notifier.", config_path, e);
            return Ok(());
        }
    };
    debug!(?config, "Loaded configuration");

    let bus = EventBus::new();
    let notifier = match Notifier::start(&config, Some(&bus)).context("Failed to start notifier")? {
        Activation::Active(notifier) => notifier,
        Activation::Disabled(_) => return Ok(()),
    };

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Error reading stdin: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match process_event(&line, &bus).await {
            Ok(listeners) => debug!(listeners, "Event processed"),
            Err(e) => warn!("Skipping invalid event: {}", e),
        }
    }

    notifier.stop();
    Ok(())
}

/// Resolve the config file path.
///
/// Uses `$HOME/.permwebhook/config.json`, falling back to the current
/// directory when `HOME` is unset.
fn resolve_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".permwebhook/config.json")
}

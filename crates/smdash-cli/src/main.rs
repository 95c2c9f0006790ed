#![deny(unsafe_code)]

//! smdash CLI: headless client for a SecureMonitor daemon.

mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use smdash_config::AppConfig;
use smdash_core::{
    DaemonApi, DashboardSession, HttpDaemonClient, Poller, RefreshOutcome, build_info,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// smdash: live dashboard client for the SecureMonitor daemon.
#[derive(Parser)]
#[command(name = "smdash", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "smdash.toml")]
    config: PathBuf,

    /// Daemon base URL (overrides `daemon.base_url`).
    #[arg(long)]
    url: Option<String>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the daemon and print new log lines and status changes.
    Watch {
        /// Stop after this many refreshes.
        #[arg(long)]
        count: Option<u32>,
    },

    /// Fetch one snapshot and print it.
    Snapshot {
        /// Print the merged snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Ask the daemon to unblock an IP, then print the blocked list.
    Unblock {
        /// The IP address to unblock.
        ip: String,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, found) = load_config(&cli.config, cli.url.as_deref()).await?;
    init_tracing(&config, cli.verbose);
    if !found {
        info!(path = %cli.config.display(), "config file not found, using defaults");
    }

    match cli.command {
        Commands::Watch { count } => cmd_watch(&config, count).await?,
        Commands::Snapshot { json } => cmd_snapshot(&config, json).await?,
        Commands::Unblock { ip } => cmd_unblock(&config, &ip).await?,
        Commands::Config { show } => cmd_config(&config, &cli.config, found, show)?,
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` raises the configured level.
fn filter_directive(config: &AppConfig, verbose: u8) -> String {
    match verbose {
        0 => config.logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn init_tracing(config: &AppConfig, verbose: u8) {
    let directive = filter_directive(config, verbose);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn cmd_watch(config: &AppConfig, count: Option<u32>) -> Result<()> {
    let client = HttpDaemonClient::from_config(config)?;
    info!(
        version = %build_info::version_string(),
        url = %client.base_url(),
        interval_ms = config.poll.interval_ms,
        "watching daemon"
    );

    let api: Arc<dyn DaemonApi> = Arc::new(client);
    let (poller, mut rx) = Poller::new(api);
    let mut session = DashboardSession::new(config);
    let ticker = poller.spawn_ticker(config.poll_interval());

    println!("{}", report::header_line(session.header()));
    let mut refreshes = 0u32;
    loop {
        let before = session.header().clone();
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                if let Some(tick) = poller.dispatch(&mut session, event) {
                    for line in report::watch_lines(&session, &tick, &before) {
                        println!("{line}");
                    }
                    refreshes += 1;
                    if count.is_some_and(|n| refreshes >= n) {
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping watch");
                break;
            }
        }
    }

    ticker.abort();
    Ok(())
}

async fn cmd_snapshot(config: &AppConfig, json: bool) -> Result<()> {
    let client = HttpDaemonClient::from_config(config)?;
    let mut session = DashboardSession::new(config);

    let tick = session.refresh(&client).await;
    if let RefreshOutcome::Failed { error, .. } = &tick.outcome {
        anyhow::bail!("could not fetch snapshot from {}: {error}", client.base_url());
    }

    if json {
        let body = serde_json::to_string_pretty(session.snapshot())
            .context("failed to serialize snapshot")?;
        println!("{body}");
    } else {
        print!("{}", report::render_report(&session, Utc::now()));
    }
    Ok(())
}

async fn cmd_unblock(config: &AppConfig, ip: &str) -> Result<()> {
    let client = HttpDaemonClient::from_config(config)?;

    // A rejected unblock is only logged; the refreshed list shows the result.
    match client.unblock(ip).await {
        Ok(()) => info!(%ip, "unblock request accepted"),
        Err(e) => warn!(%ip, error = %e, "unblock request failed"),
    }

    let mut session = DashboardSession::new(config);
    let tick = session.refresh(&client).await;
    if let RefreshOutcome::Failed { error, .. } = &tick.outcome {
        anyhow::bail!("could not refresh blocked list: {error}");
    }

    let blocked = session.blocked();
    if blocked.is_empty() {
        println!("{}", session.labels().no_blocked);
    }
    for item in &blocked.items {
        println!("{item}");
    }
    Ok(())
}

fn cmd_config(config: &AppConfig, path: &Path, found: bool, show: bool) -> Result<()> {
    if show {
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else if found {
        println!("Configuration at '{}' is valid.", path.display());
    } else {
        println!(
            "No configuration at '{}'; defaults are valid.",
            path.display()
        );
    }
    Ok(())
}

/// Load the config file if present, apply `--url`, and validate.
async fn load_config(path: &Path, url: Option<&str>) -> Result<(AppConfig, bool)> {
    let found = path.exists();
    let mut config = if found {
        AppConfig::load_unvalidated(path)
            .await
            .with_context(|| format!("invalid config {}", path.display()))?
    } else {
        AppConfig::default()
    };

    if let Some(url) = url {
        config.daemon.base_url = url.to_string();
    }
    config.validate()?;
    Ok((config, found))
}

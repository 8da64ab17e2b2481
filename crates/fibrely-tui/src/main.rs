//! `fibrely` — terminal dashboard for ISP fibre topology.
//!
//! Fetches one OLT's full device graph from the Fibrely backend, renders
//! it as an expandable tree with live port accounting, and supports
//! adding distribution devices in place.
//!
//! Logs are written to a file (default `/tmp/fibrely.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, config merging, tracing setup,
//! panic hooks, and app launch.

mod action;
mod app;
mod component;
mod config;
mod dialog;
mod event;
mod fetch;
mod theme;
mod topology;
mod tui;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use secrecy::SecretString;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use fibrely_api::{Geocoder, OltClient, TransportConfig};

use crate::app::App;

/// Terminal dashboard for ISP fibre (OLT) topology.
#[derive(Parser, Debug)]
#[command(name = "fibrely", version, about)]
struct Cli {
    /// OLT identifier to open (e.g. OLT1)
    olt_id: String,

    /// Backend base URL (e.g., https://isp.example.net)
    #[arg(short = 'u', long, env = "FIBRELY_BACKEND_URL")]
    url: Option<String>,

    /// Reverse-geocoding service base URL
    #[arg(long, env = "FIBRELY_GEOCODE_URL")]
    geocode_url: Option<String>,

    /// API key sent as X-API-KEY
    #[arg(short = 'k', long, env = "FIBRELY_API_KEY")]
    api_key: Option<String>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that
/// would corrupt the TUI output. Returns a guard that must be held for
/// the lifetime of the application to ensure logs are flushed.
fn setup_tracing(log_file: &std::path::Path, verbose: u8) -> WorkerGuard {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fibrely={log_level},fibrely_core={log_level},fibrely_api={log_level}"
        ))
    });

    let log_dir = log_file.parent().unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("fibrely.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let file_config = config::load_config_or_default();

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| file_config.log_file.clone())
        .unwrap_or_else(|| PathBuf::from("/tmp/fibrely.log"));
    let _log_guard = setup_tracing(&log_file, cli.verbose);

    // CLI flags override the config file.
    let backend_url = cli
        .url
        .clone()
        .or_else(|| file_config.backend_url.clone())
        .ok_or_else(|| {
            eyre!(
                "no backend URL configured; pass --url, set FIBRELY_BACKEND_URL, \
                 or add backend_url to {}",
                config::config_path().display()
            )
        })?;
    let geocode_url = cli
        .geocode_url
        .clone()
        .unwrap_or_else(|| file_config.geocode_url.clone());
    let api_key = cli
        .api_key
        .clone()
        .or_else(|| file_config.api_key.clone())
        .map(SecretString::from);

    info!(url = %backend_url, olt = %cli.olt_id, "starting fibrely");

    let transport = TransportConfig {
        timeout: Duration::from_secs(file_config.timeout_secs),
        api_key,
    };
    let client = OltClient::new(&backend_url, &transport)?;
    let geocoder = Geocoder::new(&geocode_url, &transport)?;

    let mut app = App::new(client, geocoder, cli.olt_id.clone());
    app.run().await?;

    Ok(())
}

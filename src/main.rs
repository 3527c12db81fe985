use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use std::path::PathBuf;

use ws_tester::{config, ui};

/// WebSocket Tester - manual testing client for WebSocket endpoints
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Path to the configuration file
    #[clap(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// WebSocket URL to place in the URL field
    #[clap(short, long)]
    url: Option<String>,

    /// Connect as soon as the window opens
    #[clap(long)]
    connect: bool,

    /// Verbose mode (repeat for more verbosity)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Configure logging based on verbosity level
    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    info!("Starting WebSocket tester v{}", env!("CARGO_PKG_VERSION"));

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    // Load configuration
    let config_path = match args.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let config = rt.block_on(config::load_config(&config_path))?;
    info!("Configuration loaded from {:?}", config_path);

    // Override configuration with command-line arguments
    let url = args
        .url
        .unwrap_or_else(|| config.connection.default_url.clone());
    let auto_connect = args.connect || config.connection.auto_connect;

    ui::run_gui(config, url, auto_connect, rt)
}

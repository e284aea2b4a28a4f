// src/main.rs

//! The main entry point for the Trunkline event monitor binary.
//!
//! Connects to the configured manager peer, registers a wildcard handler
//! that logs every event, and pumps the event stream until the peer hangs
//! up or the process is interrupted.

use anyhow::Result;
use std::env;
use tracing::{error, info};
use trunkline::config::Config;
use trunkline::{Manager, Message, MessageKind, PeerInfo};

#[tokio::main]
async fn main() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let args: Vec<String> = env::args().collect();

    if args.contains(&"--version".to_string()) {
        println!("Trunkline version {VERSION}");
        return Ok(());
    }

    // Determine the configuration path.
    // It can be provided via a --config flag; otherwise, it defaults to "config.toml".
    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or("config.toml");

    let config = match Config::from_file(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from \"{config_path}\": {e}");
            std::process::exit(1);
        }
    };

    // Get the log level from the env var, falling back to the config file.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .compact()
        .with_ansi(true)
        .init();

    if let Err(e) = run(config).await {
        error!("Monitor runtime error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

async fn run(config: Config) -> Result<(), trunkline::AmiError> {
    let mut manager = Manager::new(config);

    manager.register_event_handler("*", |event: &str, message: &Message, peer: &PeerInfo| {
        info!(
            peer = %format!("{}:{}", peer.host, peer.port),
            fields = ?message.fields(),
            "event '{event}'"
        );
    })?;

    manager.connect().await?;

    let pong = manager.ping().await?;
    info!("manager peer answered ping: {:?}", pong.get("Ping"));

    // Pump the event stream until the peer disconnects.
    loop {
        let msg = manager.read_event(true).await?;
        if msg.kind() == MessageKind::Timeout {
            continue;
        }
    }
}

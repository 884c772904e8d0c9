//! PranaIO - sensor polling daemon
//!
//! Runs with built-in defaults when started without arguments. An optional
//! TOML file overrides device paths and timing.

use prana_io::error::{Error, Result};
use prana_io::{Config, Poller};
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Parse an optional config path from command line arguments.
///
/// Supports:
/// - `prana-io` (built-in defaults)
/// - `prana-io <path>` (positional)
/// - `prana-io --config <path>` / `prana-io -c <path>`
fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

fn main() -> Result<()> {
    let config = match parse_config_path() {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("PranaIO v{} starting...", env!("CARGO_PKG_VERSION"));

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut poller = Poller::open(&config);

    let stdout = std::io::stdout();
    let cycles = poller.run(&running, &mut stdout.lock())?;

    log::info!("PranaIO stopped after {} cycles", cycles);
    Ok(())
}

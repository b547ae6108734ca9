#![deny(unsafe_code)]

mod config;
mod constants;
mod duration;
mod logging;
mod platform;
mod relay;
mod selection;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::{info, warn};

use config::Config;
use constants::{app, exit, readout};
use logging::LogSession;
use duration::format_duration_long;
use platform::SystemClipboard;
use relay::SyncLoop;
use selection::reader::SelectionReader;

/// Publishes the image editor's selection to the clipboard and translates it
/// for the consuming application
#[derive(Debug, Parser)]
#[command(name = "selection-relay", version)]
struct Cli {
    /// Config file (default: <config dir>/selection-relay/config.toml)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Validate the config file and exit
    #[arg(long)]
    check: bool,

    /// Wait for Enter before exiting
    #[arg(long)]
    wait_on_exit: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    // Outlives `run` so a fatal error still reaches the log file
    let mut log_session = None;
    let code = match run(&cli, &config_path, &mut log_session) {
        Ok(code) => code,
        Err(e) => {
            if log_session.is_none() {
                logging::init_fallback();
            }
            logging::report_fatal(&e)
        }
    };
    drop(log_session);

    if cli.wait_on_exit {
        wait_for_enter();
    }
    ExitCode::from(code)
}

fn run(cli: &Cli, config_path: &Path, log_session: &mut Option<LogSession>) -> Result<u8> {
    let config = Config::load(config_path)?;

    if cli.check {
        logging::init_fallback();
        info!(
            path = %config_path.display(),
            producer = %config.producer_executable,
            consumer = %config.consumer_executable,
            pattern = %config.selection_regex_pattern,
            logs = %config.logs_dir(config_path).display(),
            "config is valid"
        );
        return Ok(0);
    }

    let session = log_session.insert(logging::init(&config.logging, &config.logs_dir(config_path))?);
    info!(
        app = app::NAME,
        version = app::VERSION,
        host = %logging::host_name(),
        log_file = %session.log_file.display(),
        "starting"
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))
            .context(format!("Failed to register handler for signal {signal}"))?;
    }

    let reader = SelectionReader::new(config.selection_pattern()?);
    let desktop = platform::open_desktop(readout::ATTACH_TIMEOUT)?;
    let clipboard = SystemClipboard::open()?;
    let mut relay = SyncLoop::new(desktop, clipboard, reader, config.identities());

    let started = Instant::now();
    relay.run(&shutdown);

    warn!(uptime = %format_duration_long(started.elapsed()), "Operation interrupted by user.");
    Ok(exit::INTERRUPTED)
}

fn wait_for_enter() {
    eprint!("Press Enter to exit...");
    let _ = io::stderr().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

//! Console and file logging
//!
//! One tracing registry with two fmt layers, each carrying its own level
//! filter. The file layer writes through a non-blocking appender; keep the
//! returned [`LogSession`] alive until exit so buffered lines are flushed.

pub mod retention;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::Layered;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, Registry, fmt};

use crate::config::{LogFormat, LoggingSettings};
use crate::config::logging::parse_level;
use crate::constants::{app, config::LOG_LEVEL_ENV, exit};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Registry carrying the console and file layers
pub type RelaySubscriber = Layered<Vec<BoxedLayer>, Registry>;

/// Keeps the file writer flushing until dropped
pub struct LogSession {
    pub log_file: PathBuf,
    _guard: WorkerGuard,
}

#[cfg(unix)]
pub fn host_name() -> String {
    nix::unistd::gethostname()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown-host".to_string())
}

#[cfg(windows)]
pub fn host_name() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_else(|_| "unknown-host".to_string())
}

/// `<timestamp>_<app>_<host>.log`
fn log_file_name(timestamp: &str, host: &str) -> String {
    format!("{timestamp}_{}_{host}.log", app::NAME)
}

/// A valid `LOG_LEVEL` value wins over the configured console level
fn console_level(settings: &LoggingSettings, env_override: Option<&str>) -> LevelFilter {
    env_override
        .and_then(parse_level)
        .unwrap_or_else(|| settings.console_level())
}

fn fmt_layer<W>(format: LogFormat, timer: ChronoLocal, writer: W, ansi: bool, level: LevelFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_timer(timer)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false);
    match format {
        LogFormat::Full => layer.with_filter(level).boxed(),
        LogFormat::Compact => layer.compact().with_filter(level).boxed(),
        LogFormat::Pretty => layer.pretty().with_filter(level).boxed(),
    }
}

/// Build the subscriber without installing it: `console` receives lines at
/// `console_level`, a fresh file under `<logs_dir>/<app>/` the configured
/// file level.
pub fn build<W>(
    settings: &LoggingSettings,
    logs_dir: &Path,
    console_level: LevelFilter,
    console: W,
    console_ansi: bool,
) -> Result<(RelaySubscriber, LogSession)>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let log_dir = logs_dir.join(app::NAME);
    fs::create_dir_all(&log_dir)
        .context(format!("Failed to create log directory {}", log_dir.display()))?;

    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let file_name = log_file_name(&timestamp, &host_name());
    let log_file = log_dir.join(&file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(&log_dir, &file_name));

    let timer = ChronoLocal::new(settings.date_format.clone());
    let layers = vec![
        fmt_layer(settings.format(), timer.clone(), console, console_ansi, console_level),
        fmt_layer(settings.format(), timer, file_writer, false, settings.file_level()),
    ];
    let subscriber = tracing_subscriber::registry().with(layers);
    Ok((subscriber, LogSession { log_file, _guard: guard }))
}

/// Report fallen-back settings and trim the log folder to its size cap.
/// Runs under the freshly built subscriber.
fn finish_setup(settings: &LoggingSettings, session: &LogSession, console_level: LevelFilter) {
    for (key, value) in settings.unrecognized() {
        warn!(key, value, "Unrecognized logging setting, using default");
    }
    info!(console = %console_level, file = %settings.file_level(), "logging initialized");

    let Some(max_bytes) = settings.max_folder_size else {
        return;
    };
    let Some(log_dir) = session.log_file.parent() else {
        return;
    };
    match retention::enforce_max_folder_size(log_dir, max_bytes) {
        Ok(deleted) if !deleted.is_empty() => {
            info!(count = deleted.len(), max_bytes, "Pruned old log files");
        }
        Ok(_) => {}
        Err(e) => warn!(error = ?e, "Failed to enforce log folder size"),
    }
}

/// Install the global subscriber: console plus a fresh file under
/// `<logs_dir>/<app>/`, then trim the folder to its size cap.
/// `LOG_LEVEL` overrides the configured console level.
pub fn init(settings: &LoggingSettings, logs_dir: &Path) -> Result<LogSession> {
    let env_level = std::env::var(LOG_LEVEL_ENV).ok();
    let console_level = console_level(settings, env_level.as_deref());
    let (subscriber, session) = build(settings, logs_dir, console_level, std::io::stdout, true)?;
    subscriber
        .try_init()
        .context("Failed to install tracing subscriber")?;
    finish_setup(settings, &session, console_level);
    Ok(session)
}

/// Log a startup failure and return the fatal exit status. Call while the
/// [`LogSession`] is still alive so the line reaches the file.
pub fn report_fatal(error: &anyhow::Error) -> u8 {
    error!(error = ?error, "A fatal error has occurred");
    exit::FATAL
}

/// Console-only logging for reporting failures that happen before the
/// config (and with it the real logging setup) is available
pub fn init_fallback() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .with_target(false)
        .try_init();
}

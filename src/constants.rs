//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

use std::time::Duration;

/// Application identity
pub mod app {
    /// Name used for the config directory, log folder and log file names
    pub const NAME: &str = "selection-relay";

    /// Version reported in the startup banner
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Default identities of the two cooperating applications
pub mod identity {
    /// Executable name of the raster image editor whose selection is read
    pub const PRODUCER_EXECUTABLE: &str = "paintdotnet.exe";

    /// Executable name of the application that consumes the structured form
    pub const CONSUMER_EXECUTABLE: &str = "PRS.exe";
}

/// Poll delays applied after each cycle, per role
pub mod polling {
    use super::Duration;

    /// Delay after a cycle with no resolvable focused application
    pub const NO_FOCUS_DELAY: Duration = Duration::from_millis(500);

    /// Delay after a cycle spent reading the producer's selection
    pub const PRODUCER_DELAY: Duration = Duration::from_millis(100);

    /// Delay after a cycle with the designated consumer focused
    pub const CONSUMER_DELAY: Duration = Duration::from_millis(500);

    /// Delay after a cycle with any other application focused
    pub const OTHER_DELAY: Duration = Duration::from_millis(500);
}

/// Status readout lookup inside the producer's accessibility tree
pub mod readout {
    use super::Duration;

    /// Automation identifier of the producer's status bar
    pub const STATUS_BAR_ID: &str = "statusBar";

    /// Phrase identifying the selection-size text inside the status bar
    pub const SELECTION_MARKER: &str = "Selection top left";

    /// Four runs of digits separated by arbitrary non-digit text
    pub const DEFAULT_PATTERN: &str = r"(\d+)[^\d]+(\d+)[^\d]+(\d+)[^\d]+(\d+)";

    /// Number of capture groups the selection pattern must expose
    pub const REQUIRED_GROUPS: usize = 4;

    /// Upper bound on waiting for the status bar to appear
    pub const WAIT_TIMEOUT: Duration = Duration::from_secs(2);

    /// Retry granularity while waiting for the status bar
    pub const RETRY_INTERVAL: Duration = Duration::from_millis(200);

    /// Budget for attaching to a process's accessibility tree
    pub const ATTACH_TIMEOUT: Duration = Duration::from_millis(200);
}

/// Configuration file location and logging defaults
pub mod config {
    /// Config directory name under the platform config dir
    pub const APP_DIR: &str = "selection-relay";

    /// Config filename
    pub const FILENAME: &str = "config.toml";

    pub const DEFAULT_LOG_LEVEL: &str = "INFO";

    pub const DEFAULT_LOGS_FOLDER: &str = "logs";

    /// Timestamp format used in log lines (chrono syntax)
    pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

    /// Environment variable that overrides the console log level
    pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
}

/// Wine process detection constants
pub mod wine {
    /// Wine 64-bit preloader process name
    pub const WINE64_PRELOADER: &str = "wine64-preloader";

    /// Wine 32-bit preloader process name
    pub const WINE_PRELOADER: &str = "wine-preloader";
}

/// Process exit statuses
pub mod exit {
    /// Unrecoverable startup failure (missing or invalid configuration)
    pub const FATAL: u8 = 1;

    /// Stopped by SIGINT/SIGTERM
    pub const INTERRUPTED: u8 = 130;
}

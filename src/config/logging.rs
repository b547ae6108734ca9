//! `[logging]` table of the config file

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::constants::config::{DEFAULT_DATE_FORMAT, DEFAULT_LOG_LEVEL, DEFAULT_LOGS_FOLDER};

/// Line layout of log output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Full,
    Compact,
    Pretty,
}

impl LogFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Accepts both tracing and Python-style level names, case-insensitively
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_uppercase().as_str() {
        "OFF" => Some(LevelFilter::OFF),
        "TRACE" | "NOTSET" => Some(LevelFilter::TRACE),
        "DEBUG" => Some(LevelFilter::DEBUG),
        "INFO" => Some(LevelFilter::INFO),
        "WARN" | "WARNING" => Some(LevelFilter::WARN),
        "ERROR" | "CRITICAL" => Some(LevelFilter::ERROR),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub console_logging_level: String,
    pub file_logging_level: String,
    /// `full`, `compact` or `pretty`
    pub log_message_format: String,
    /// chrono format for line timestamps
    pub date_format: String,
    /// Relative paths resolve against the config file's directory
    pub logs_folder_name: PathBuf,
    /// Cap on the total size of the log folder, in bytes
    #[serde(alias = "max_folder_size_bytes", skip_serializing_if = "Option::is_none")]
    pub max_folder_size: Option<u64>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            console_logging_level: DEFAULT_LOG_LEVEL.to_string(),
            file_logging_level: DEFAULT_LOG_LEVEL.to_string(),
            log_message_format: "full".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            logs_folder_name: PathBuf::from(DEFAULT_LOGS_FOLDER),
            max_folder_size: None,
        }
    }
}

impl LoggingSettings {
    /// Unknown level names fall back to DEBUG
    pub fn console_level(&self) -> LevelFilter {
        parse_level(&self.console_logging_level).unwrap_or(LevelFilter::DEBUG)
    }

    pub fn file_level(&self) -> LevelFilter {
        parse_level(&self.file_logging_level).unwrap_or(LevelFilter::DEBUG)
    }

    /// Unknown formats fall back to `full`
    pub fn format(&self) -> LogFormat {
        LogFormat::parse(&self.log_message_format).unwrap_or(LogFormat::Full)
    }

    /// Settings that were not recognized and fell back to a default,
    /// as (key, configured value) pairs
    pub fn unrecognized(&self) -> Vec<(&'static str, &str)> {
        let mut unknown = Vec::new();
        if parse_level(&self.console_logging_level).is_none() {
            unknown.push(("console_logging_level", self.console_logging_level.as_str()));
        }
        if parse_level(&self.file_logging_level).is_none() {
            unknown.push(("file_logging_level", self.file_logging_level.as_str()));
        }
        if LogFormat::parse(&self.log_message_format).is_none() {
            unknown.push(("log_message_format", self.log_message_format.as_str()));
        }
        unknown
    }
}

//! Configuration for the relay
//!
//! A single TOML file, loaded once at startup. Every key is optional; a
//! missing file is an error, an empty file is all defaults.

pub mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use logging::{LogFormat, LoggingSettings};

use crate::constants::{identity, readout};
use crate::relay::Identities;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Applied to the selection readout; the first four groups are x, y, width, height
    #[serde(alias = "paintdotnet_selection_regex_pattern")]
    pub selection_regex_pattern: String,

    /// Executable name of the image editor
    pub producer_executable: String,

    /// Executable name of the application that wants the structured encoding
    pub consumer_executable: String,

    pub logging: LoggingSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selection_regex_pattern: readout::DEFAULT_PATTERN.to_string(),
            producer_executable: identity::PRODUCER_EXECUTABLE.to_string(),
            consumer_executable: identity::CONSUMER_EXECUTABLE.to_string(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Load and validate the config file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("File not found: \"{}\"", path.display());
        }
        let contents = fs::read_to_string(path)
            .context(format!("Failed to read config file {}", path.display()))?;
        Self::parse(&contents).context(format!("Invalid config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("Failed to parse TOML")?;
        config.selection_pattern()?;
        Ok(config)
    }

    /// Compiled selection pattern; must expose at least four capture groups
    pub fn selection_pattern(&self) -> Result<Regex> {
        let pattern = Regex::new(&self.selection_regex_pattern)
            .context(format!("Invalid selection_regex_pattern {:?}", self.selection_regex_pattern))?;
        let groups = pattern.captures_len() - 1;
        if groups < readout::REQUIRED_GROUPS {
            anyhow::bail!(
                "selection_regex_pattern {:?} has {} capture groups, needs {}",
                self.selection_regex_pattern,
                groups,
                readout::REQUIRED_GROUPS
            );
        }
        Ok(pattern)
    }

    pub fn identities(&self) -> Identities {
        Identities {
            producer: self.producer_executable.clone(),
            consumer: self.consumer_executable.clone(),
        }
    }

    /// Log folder, resolved against the directory holding the config file
    pub fn logs_dir(&self, config_path: &Path) -> PathBuf {
        let folder = &self.logging.logs_folder_name;
        if folder.is_absolute() {
            return folder.clone();
        }
        config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.producer_executable, "paintdotnet.exe");
        assert_eq!(config.consumer_executable, "PRS.exe");
        assert_eq!(config.logging.max_folder_size, None);
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            selection_regex_pattern = '(\d+);(\d+);(\d+);(\d+)'
            producer_executable = "gimp.exe"
            consumer_executable = "viewer.exe"

            [logging]
            console_logging_level = "WARNING"
            file_logging_level = "debug"
            log_message_format = "compact"
            logs_folder_name = "var/logs"
            max_folder_size = 1048576
            "#,
        )
        .unwrap();

        assert_eq!(config.selection_regex_pattern, r"(\d+);(\d+);(\d+);(\d+)");
        assert_eq!(
            config.identities(),
            Identities {
                producer: "gimp.exe".to_string(),
                consumer: "viewer.exe".to_string(),
            }
        );
        assert_eq!(config.logging.console_level(), tracing::level_filters::LevelFilter::WARN);
        assert_eq!(config.logging.format(), LogFormat::Compact);
        assert_eq!(config.logging.max_folder_size, Some(1_048_576));
    }

    #[test]
    fn test_legacy_pattern_key() {
        let config = Config::parse(r#"paintdotnet_selection_regex_pattern = 'a(\d+)b(\d+)c(\d+)d(\d+)'"#).unwrap();
        assert_eq!(config.selection_regex_pattern, r"a(\d+)b(\d+)c(\d+)d(\d+)");
    }

    #[test]
    fn test_rejects_invalid_pattern() {
        assert!(Config::parse(r#"selection_regex_pattern = '(\d+'"#).is_err());
    }

    #[test]
    fn test_rejects_pattern_with_too_few_groups() {
        let err = Config::parse(r#"selection_regex_pattern = '(\d+) (\d+) (\d+)'"#).unwrap_err();
        assert!(format!("{err:#}").contains("capture groups"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "producer_executable = \"krita.exe\"").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.producer_executable, "krita.exe");
        assert_eq!(config.logs_dir(&path), dir.path().join("logs"));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "producer_executable = ").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_absolute_logs_dir_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.logging.logs_folder_name = dir.path().to_path_buf();
        assert_eq!(config.logs_dir(Path::new("/etc/relay/config.toml")), dir.path());
    }
}

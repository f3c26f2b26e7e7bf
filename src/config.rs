//! Configuration module
//!
//! Holds the episode patterns and naming templates. A `Config` value is
//! passed explicitly to the parser and to rendering; there is no global
//! configuration. Configurations persist as JSON, by default in the system's
//! standard configuration directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pattern::DEFAULT_EPISODE_PATTERNS;

/// Version written to and expected from configuration files
pub const CONFIG_VERSION: u32 = 1;

/// Name of the configuration file inside the configuration directory
const CONFIG_FILE_NAME: &str = "config.json";

/// Errors that can occur while loading or saving a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine the configuration directory location
    #[error("Failed to determine configuration directory location")]
    ConfigDirectoryNotFound,

    /// The configuration file could not be read, written or parsed
    #[error("Invalid config file {path}: {reason}")]
    InvalidConfigFile { path: PathBuf, reason: String },

    /// The configuration file was written for another version
    #[error("Wrong config version: expected version {expected}, got version {found}")]
    WrongConfigVersion { expected: u32, found: u32 },
}

/// Templates and number formats used to build new filenames
///
/// Templates use printf-style named placeholders: `%(showname)s`,
/// `%(seasonno)02d`, `%(episode)s` and `%(episodename)s`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingTemplates {
    /// Filename template used when an episode title is known
    #[serde(rename = "filename_with_episode")]
    pub with_episode_title: String,

    /// Filename template used when no episode title is known
    #[serde(rename = "filename_without_episode")]
    pub without_episode_title: String,

    /// Format applied to each episode number, e.g. `e%02d`
    #[serde(rename = "episode_single")]
    pub single_episode_format: String,

    /// String joining multiple formatted episode numbers
    #[serde(rename = "episode_separator", alias = "episode_seperator")]
    pub episode_number_separator: String,
}

impl Default for NamingTemplates {
    fn default() -> Self {
        Self {
            with_episode_title: "%(showname)s - [%(seasonno)02dx%(episode)s] - %(episodename)s"
                .to_string(),
            without_episode_title: "%(showname)s - [%(seasonno)02dx%(episode)s]".to_string(),
            single_episode_format: "e%02d".to_string(),
            episode_number_separator: String::new(),
        }
    }
}

/// Complete tvnamer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration format version
    pub version: u32,

    /// Descend into subdirectories when searching for files
    pub recursive: bool,

    /// Only consider files whose content looks like a video
    pub videos_only: bool,

    /// Keep the original file extension when renaming
    pub keep_extension: bool,

    /// Episode patterns, highest priority first
    pub episode_patterns: Vec<String>,

    /// Naming templates
    #[serde(flatten)]
    pub naming: NamingTemplates,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            recursive: false,
            videos_only: false,
            keep_extension: true,
            episode_patterns: DEFAULT_EPISODE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            naming: NamingTemplates::default(),
        }
    }
}

impl Config {
    /// Parses a configuration from JSON
    ///
    /// Keys missing from the document take their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::parse(json, Path::new("<memory>"))
    }

    /// Loads a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| invalid(path, e))?;
        Self::parse(&content, path)
    }

    /// Loads a configuration file, falling back to defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Writes the configuration as pretty-printed JSON
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|e| invalid(path, e))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| invalid(path, e))?;
        }

        fs::write(path, content).map_err(|e| invalid(path, e))
    }

    /// Returns the default configuration file path
    ///
    /// - Linux: ~/.config/tvnamer/config.json
    /// - macOS: ~/Library/Application Support/tvnamer/config.json
    /// - Windows: %APPDATA%\tvnamer\config\config.json
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let proj_dirs = directories::ProjectDirs::from("", "", "tvnamer")
            .ok_or(ConfigError::ConfigDirectoryNotFound)?;

        Ok(proj_dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    fn parse(json: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json).map_err(|e| invalid(path, e))?;

        if config.version != CONFIG_VERSION {
            return Err(ConfigError::WrongConfigVersion {
                expected: CONFIG_VERSION,
                found: config.version,
            });
        }

        Ok(config)
    }
}

fn invalid(path: &Path, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidConfigFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.keep_extension);
        assert!(!config.recursive);
        assert_eq!(config.episode_patterns.len(), DEFAULT_EPISODE_PATTERNS.len());
        assert_eq!(config.naming.single_episode_format, "e%02d");
        assert_eq!(config.naming.episode_number_separator, "");
    }

    #[test]
    fn test_partial_document_takes_defaults() {
        let config = Config::from_json(
            r#"{"version": 1, "recursive": true, "episode_seperator": "-"}"#,
        )
        .unwrap();
        assert!(config.recursive);
        assert_eq!(config.naming.episode_number_separator, "-");
        assert_eq!(config.naming, NamingTemplates {
            episode_number_separator: "-".to_string(),
            ..NamingTemplates::default()
        });
        assert_eq!(config.episode_patterns, Config::default().episode_patterns);
    }

    #[test]
    fn test_wrong_version() {
        let result = Config::from_json(r#"{"version": 2}"#);
        assert!(matches!(
            result,
            Err(ConfigError::WrongConfigVersion { expected: 1, found: 2 })
        ));
    }

    #[test]
    fn test_malformed_document() {
        let result = Config::from_json("{not json");
        assert!(matches!(result, Err(ConfigError::InvalidConfigFile { .. })));

        let result = Config::from_json(r#"{"recursive": "yes"}"#);
        assert!(matches!(result, Err(ConfigError::InvalidConfigFile { .. })));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.episode_patterns = vec![r"^(?P<showname>.+)\.(?P<episodenumber>\d+)".to_string()];
        config.naming.single_episode_format = "E%02d".to_string();
        config.save(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"filename_with_episode\""));
        assert!(written.contains("\"episode_separator\""));

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::InvalidConfigFile { .. })
        ));
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
    }
}

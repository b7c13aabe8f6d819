use std::{
    env, fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{NoteError, Result};

/// Environment variable overriding the notes directory.
pub const NOTES_DIR_ENV: &str = "QUICKNOTES_NOTES_DIR";

/// Directory used when nothing else is configured.
pub const DEFAULT_NOTES_DIR: &str = "notes";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory where notes are stored
    pub notes_dir: PathBuf,

    /// Address the HTTP server binds to
    pub server_address: String,

    /// Port the HTTP server listens on
    pub server_port: u16,

    /// Default log filter when RUST_LOG is not set
    pub log_level: String,

    /// File the settings were read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_dir: PathBuf::from(DEFAULT_NOTES_DIR),
            server_address: "127.0.0.1".to_string(),
            server_port: 8080,
            log_level: "info".to_string(),
            source: None,
        }
    }
}

impl Config {
    /// Resolves the configuration from file and environment.
    ///
    /// An explicit path must exist and parse. Without one, the platform
    /// config directory is consulted and silently skipped when absent.
    /// Nothing is logged here since the logger is configured from the result.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        if let Ok(dir) = env::var(NOTES_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.notes_dir = PathBuf::from(dir);
            }
        }

        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| NoteError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let mut config: Config = serde_json::from_str(&raw).map_err(|e| NoteError::ConfigError {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Location of `config.json` in the platform configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "quicknotes").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Applies a notes directory given on the command line.
    pub fn with_notes_dir(mut self, notes_dir: Option<String>) -> Self {
        if let Some(dir) = notes_dir.filter(|d| !d.trim().is_empty()) {
            self.notes_dir = PathBuf::from(dir);
        }
        self
    }

    /// The `address:port` pair the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_address, self.server_port)
    }
}

//! Plugin configuration.
//!
//! Optional JSON file in the platform config directory, e.g.
//! `~/.config/mumble-factorio/config.json` on Linux:
//!
//! ```json
//! {
//!   "telemetryPath": "/mnt/games/Factorio/script-output/player_position.txt",
//!   "maxAgeSecs": 5,
//!   "gameExecutables": ["factorio.exe", "factorio"]
//! }
//! ```
//!
//! Every key is optional. A missing or broken file yields the defaults.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;

use factorio_core::freshness::{effective_max_age, DEFAULT_MAX_AGE_SECS};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Executable names Mumble reports for a running Factorio.
pub const DEFAULT_GAME_EXECUTABLES: [&str; 2] = ["factorio.exe", "factorio"];

pub fn get_project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "alifeee", "mumble-factorio")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginConfig {
    /// Use this telemetry file instead of the one under the home directory
    pub telemetry_path: Option<PathBuf>,
    /// Staleness threshold; zero or negative means the default
    pub max_age_secs: i64,
    /// Process names that count as "the game is running"
    pub game_executables: Vec<String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            telemetry_path: None,
            max_age_secs: DEFAULT_MAX_AGE_SECS as i64,
            game_executables: DEFAULT_GAME_EXECUTABLES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl PluginConfig {
    /// Where the config file is looked for, if the platform has a config dir.
    pub fn config_file() -> Option<PathBuf> {
        get_project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load from the platform config file, falling back to defaults.
    pub fn load() -> Self {
        match Self::config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory on this platform, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Failed to open config {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to parse config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// The effective staleness threshold.
    pub fn max_age(&self) -> Duration {
        effective_max_age(self.max_age_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PluginConfig::default();
        assert_eq!(config.telemetry_path, None);
        assert_eq!(config.max_age(), Duration::from_secs(2));
        assert_eq!(config.game_executables, vec!["factorio.exe", "factorio"]);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = PluginConfig::load_from(&temp.path().join(CONFIG_FILE_NAME));
        assert_eq!(config, PluginConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"maxAgeSecs": 20}"#).unwrap();

        let config = PluginConfig::load_from(&path);
        assert_eq!(config.max_age(), Duration::from_secs(20));
        assert_eq!(config.game_executables, vec!["factorio.exe", "factorio"]);
    }

    #[test]
    fn test_full_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{"telemetryPath": "/tmp/pos.txt", "maxAgeSecs": -1, "gameExecutables": ["factorio-headless"]}"#,
        )
        .unwrap();

        let config = PluginConfig::load_from(&path);
        assert_eq!(config.telemetry_path, Some(PathBuf::from("/tmp/pos.txt")));
        assert_eq!(config.max_age(), Duration::from_secs(2));
        assert_eq!(config.game_executables, vec!["factorio-headless"]);
    }

    #[test]
    fn test_invalid_json_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(PluginConfig::load_from(&path), PluginConfig::default());
    }
}

//! Telemetry Locator
//!
//! The Factorio mod writes into the game's `script-output` directory. Its
//! location is derived from the user's roaming application data directory on
//! Windows and from the home directory elsewhere.

use directories::BaseDirs;
use std::path::{Path, PathBuf};

use factorio_core::TelemetryError;

use crate::config::PluginConfig;

/// Path of the telemetry file relative to the base directory.
pub const TELEMETRY_SUFFIX: [&str; 3] = ["Factorio", "script-output", "player_position.txt"];

/// The platform directory the telemetry suffix hangs off.
pub fn base_dir() -> Result<PathBuf, TelemetryError> {
    let dirs = BaseDirs::new().ok_or_else(|| {
        TelemetryError::LocatorFailure("cannot determine the user's home directory".to_string())
    })?;

    #[cfg(windows)]
    let base = dirs.config_dir();
    #[cfg(not(windows))]
    let base = dirs.home_dir();

    Ok(base.to_path_buf())
}

/// Join the telemetry suffix onto `base`.
pub fn telemetry_path_in(base: &Path) -> PathBuf {
    TELEMETRY_SUFFIX.iter().fold(base.to_path_buf(), |path, part| path.join(part))
}

/// Absolute path of the telemetry file for this user.
pub fn locate() -> Result<PathBuf, TelemetryError> {
    base_dir().map(|base| telemetry_path_in(&base))
}

/// The configured override, or the located default.
pub fn resolve(config: &PluginConfig) -> Result<PathBuf, TelemetryError> {
    match &config.telemetry_path {
        Some(path) => Ok(path.clone()),
        None => locate(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_path_in() {
        let path = telemetry_path_in(Path::new("/home/engineer"));
        assert_eq!(
            path,
            Path::new("/home/engineer")
                .join("Factorio")
                .join("script-output")
                .join("player_position.txt")
        );
        assert!(path.ends_with("Factorio/script-output/player_position.txt"));
    }

    #[test]
    fn test_override_wins() {
        let config = PluginConfig {
            telemetry_path: Some(PathBuf::from("/srv/pos.txt")),
            ..PluginConfig::default()
        };
        assert_eq!(resolve(&config), Ok(PathBuf::from("/srv/pos.txt")));
    }

    #[test]
    fn test_located_path_has_suffix() {
        // Build machines normally have a home directory; if not, the error
        // must be a locator failure.
        match locate() {
            Ok(path) => assert!(path.ends_with("Factorio/script-output/player_position.txt")),
            Err(e) => assert!(e.is_permanent()),
        }
    }
}

//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\playlist-minder\config.toml
//! - macOS: ~/Library/Application Support/playlist-minder/config.toml
//! - Linux: ~/.config/playlist-minder/config.toml
//!
//! The config file holds Spotify credentials and where state lives. The
//! per-playlist settings table is a separate file (see [`crate::settings`]).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spotify application credentials
    pub credentials: Credentials,

    /// Data and settings locations
    pub paths: PathsConfig,

    /// Sync behaviour
    pub sync: SyncConfig,
}

/// Spotify application credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Spotify user that owns the managed playlists
    pub username: String,
    /// Client id of the registered Spotify application
    pub client_id: String,
    /// Client secret of the registered Spotify application
    pub client_secret: String,
    /// Redirect URI registered for the application
    pub redirect_uri: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
        }
    }
}

impl Credentials {
    /// Names of required fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.username.is_empty() {
            missing.push("username");
        }
        if self.client_id.is_empty() {
            missing.push("client_id");
        }
        if self.client_secret.is_empty() {
            missing.push("client_secret");
        }
        if self.redirect_uri.is_empty() {
            missing.push("redirect_uri");
        }
        missing
    }
}

/// Data and settings locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding history files and the token cache
    pub data_dir: Option<PathBuf>,
    /// Playlist settings table (defaults to `<data_dir>/playlist_settings.txt`)
    pub settings_file: Option<PathBuf>,
}

impl PathsConfig {
    /// Resolved data directory.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(default_data_dir)
    }

    /// Resolved settings table path.
    pub fn settings_file(&self) -> Option<PathBuf> {
        self.settings_file
            .clone()
            .or_else(|| self.data_dir().map(|d| d.join("playlist_settings.txt")))
    }
}

/// Sync behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Zero-based settings row used by `test`
    pub test_row: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { test_row: 1 }
    }
}

// ============================================================================
// Reading and writing config.toml
// ============================================================================

/// Directory holding `config.toml`
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("playlist-minder"))
}

/// Location of `config.toml`
pub fn config_path() -> Option<PathBuf> {
    Some(config_dir()?.join("config.toml"))
}

/// Default location for history files and the token cache
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("playlist-minder"))
}

/// Read `config.toml`, falling back to defaults.
///
/// A missing or unreadable file is logged, never fatal: credentials can
/// still arrive through the environment.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("No config directory on this platform, using defaults");
        return Config::default();
    };
    if !path.exists() {
        tracing::debug!("{:?} does not exist, using defaults", path);
        return Config::default();
    }

    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|raw| toml::from_str::<Config>(&raw).map_err(|e| e.to_string()));

    parsed.unwrap_or_else(|e| {
        tracing::error!("Ignoring config {:?}: {}", path, e);
        Config::default()
    })
}

/// Write `config.toml` through a temp file and rename.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::Io(dir.clone(), e))?;

    let path = dir.join("config.toml");
    let temp_path = path.with_extension("toml.tmp");
    let contents = toml::to_string_pretty(config)?;

    std::fs::write(&temp_path, contents).map_err(|e| ConfigError::Io(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, &path).map_err(|e| ConfigError::Io(path.clone(), e))?;

    tracing::info!("Wrote {:?}", path);
    Ok(())
}

/// Failure to write `config.toml`
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("This platform has no config directory")]
    NoConfigDir,

    #[error("Cannot write {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Cannot encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_write_every_section() {
        let encoded = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(encoded.contains("[credentials]"));
        assert!(encoded.contains("[sync]"));
    }

    #[test]
    fn test_credentials_survive_encoding() {
        let mut config = Config::default();
        config.credentials.username = "kcrw-fan".to_string();
        config.credentials.client_id = "client-123".to_string();
        config.paths.data_dir = Some(PathBuf::from("/var/lib/playlist-minder"));

        let encoded = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&encoded).unwrap();

        assert_eq!(parsed.credentials.username, "kcrw-fan");
        assert_eq!(parsed.credentials.client_id, "client-123");
        assert_eq!(
            parsed.paths.data_dir,
            Some(PathBuf::from("/var/lib/playlist-minder"))
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let partial = r#"
[credentials]
username = "kcrw-fan"
"#;
        let config: Config = toml::from_str(partial).unwrap();

        assert_eq!(config.credentials.username, "kcrw-fan");
        assert_eq!(
            config.credentials.redirect_uri,
            "http://127.0.0.1:8888/callback"
        );
        assert_eq!(config.sync.test_row, 1);
        assert!(config.paths.data_dir.is_none());
    }

    #[test]
    fn test_settings_file_defaults_under_data_dir() {
        let paths = PathsConfig {
            data_dir: Some(PathBuf::from("/srv/minder")),
            settings_file: None,
        };
        assert_eq!(
            paths.settings_file(),
            Some(PathBuf::from("/srv/minder/playlist_settings.txt"))
        );
    }

    #[test]
    fn test_missing_credentials_are_listed() {
        let creds = Credentials {
            username: "someone".to_string(),
            ..Default::default()
        };
        assert_eq!(creds.missing_fields(), vec!["client_id", "client_secret"]);
    }
}

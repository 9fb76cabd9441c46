//! Client configuration.

use crate::board::DEFAULT_BOARD_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "ws://localhost:5000/socket.io/?EIO=4&transport=websocket";

pub const ENV_SERVER: &str = "PEELGRID_SERVER";
pub const ENV_BOARD_SIZE: &str = "PEELGRID_BOARD_SIZE";
pub const ENV_PLAYER: &str = "PEELGRID_PLAYER";
pub const ENV_DATA_DIR: &str = "PEELGRID_DATA_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// socket.io WebSocket endpoint.
    pub server_url: String,
    /// Rows and columns of the square board.
    pub board_size: i32,
    pub player_name: Option<String>,
    /// Where the identity file lives. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            board_size: DEFAULT_BOARD_SIZE,
            player_name: None,
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PEELGRID_*` overrides fetched through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SERVER) {
            self.server_url = url;
        }
        if let Some(size) = lookup(ENV_BOARD_SIZE) {
            self.board_size = size
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: ENV_BOARD_SIZE, value: size })?;
        }
        if let Some(player) = lookup(ENV_PLAYER) {
            self.player_name = Some(player);
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "board_size",
                value: self.board_size.to_string(),
            });
        }
        if !(self.server_url.starts_with("ws://") || self.server_url.starts_with("wss://")) {
            return Err(ConfigError::InvalidValue {
                key: "server_url",
                value: self.server_url.clone(),
            });
        }
        Ok(())
    }

    /// Base URL for the REST endpoints, derived from the socket URL.
    ///
    /// `wss://host:port/socket.io/?...` becomes `https://host:port`.
    pub fn http_base(&self) -> String {
        let (scheme, rest) = match self.server_url.split_once("://") {
            Some(("wss", rest)) => ("https", rest),
            Some((_, rest)) => ("http", rest),
            None => ("http", self.server_url.as_str()),
        };
        let authority = rest.split(['/', '?']).next().unwrap_or(rest);
        format!("{}://{}", scheme, authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.board_size, 40);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ClientConfig::default();
        config
            .apply_overrides(lookup(&[
                (ENV_SERVER, "wss://play.example.com/socket.io/?EIO=4&transport=websocket"),
                (ENV_BOARD_SIZE, " 35 "),
                (ENV_PLAYER, "alice"),
                (ENV_DATA_DIR, "/tmp/peelgrid"),
            ]))
            .unwrap();
        assert_eq!(config.board_size, 35);
        assert_eq!(config.player_name.as_deref(), Some("alice"));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/peelgrid")));
        assert_eq!(config.http_base(), "https://play.example.com");
    }

    #[test]
    fn test_bad_board_size() {
        let mut config = ClientConfig::default();
        let err = config
            .apply_overrides(lookup(&[(ENV_BOARD_SIZE, "huge")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_BOARD_SIZE, .. }));

        config.board_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peelgrid.json");
        std::fs::write(&path, r#"{"board_size": 25, "player_name": "bob"}"#).unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.board_size, 25);
        assert_eq!(config.player_name.as_deref(), Some("bob"));
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(ClientConfig::from_file(&missing), Err(ConfigError::Io { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{").unwrap();
        assert!(matches!(ClientConfig::from_file(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_http_base() {
        let config = ClientConfig::default();
        assert_eq!(config.http_base(), "http://localhost:5000");

        let bare = ClientConfig {
            server_url: "ws://10.0.0.2:8080".into(),
            ..Default::default()
        };
        assert_eq!(bare.http_base(), "http://10.0.0.2:8080");
    }

    #[test]
    fn test_bad_scheme() {
        let config = ClientConfig {
            server_url: "http://localhost:5000".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

//! Daemon configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, an
//! optional TOML file, then CLI flags / environment variables applied by the
//! binary through [`Config::apply`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default listen port
pub const DEFAULT_PORT: u16 = 4000;

/// Default heartbeat window in milliseconds
pub const DEFAULT_ACTIVE_WINDOW_MS: u64 = 10_000;

/// Resolved daemon settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address to bind
    pub host: IpAddr,

    /// Port to bind
    pub port: u16,

    /// Directory with the servable `.html` pages and assets
    pub public_dir: PathBuf,

    /// JSON file backing the message board
    pub messages_file: PathBuf,

    /// Heartbeats older than this no longer count as online
    pub active_window_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            public_dir: PathBuf::from("public"),
            messages_file: PathBuf::from("messages.json"),
            active_window_ms: DEFAULT_ACTIVE_WINDOW_MS,
        }
    }
}

/// Per-field overrides, typically from CLI flags or environment variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<IpAddr>,
    pub port: Option<u16>,
    pub public_dir: Option<PathBuf>,
    pub messages_file: Option<PathBuf>,
    pub active_window_ms: Option<u64>,
}

impl Config {
    /// Loads the TOML file at `path`, or defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Read` if the file cannot be read
    /// - `ConfigError::Parse` if it is not valid TOML for this struct
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                })?;
                Self::from_toml(&contents).map_err(|e| match e {
                    ConfigError::Parse { error, .. } => ConfigError::Parse {
                        path: path.to_path_buf(),
                        error,
                    },
                    other => other,
                })
            }
            None => Ok(Self::default()),
        }
    }

    /// Parses TOML text. Missing keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Applies overrides on top of the current values.
    #[must_use]
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(dir) = overrides.public_dir {
            self.public_dir = dir;
        }
        if let Some(file) = overrides.messages_file {
            self.messages_file = file;
        }
        if let Some(ms) = overrides.active_window_ms {
            self.active_window_ms = ms;
        }
        self
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn active_window(&self) -> Duration {
        Duration::from_millis(self.active_window_ms)
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Read { path: PathBuf, error: String },

    #[error("Invalid config file {path}: {error}")]
    Parse { path: PathBuf, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 4000);
        assert_eq!(config.active_window(), Duration::from_millis(10_000));
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:4000");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("port = 8080\npublic_dir = \"site\"\n").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.public_dir, PathBuf::from("site"));
        assert_eq!(config.messages_file, PathBuf::from("messages.json"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = Config::from_toml("prot = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = \"127.0.0.1\"\nactive_window_ms = 500").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.active_window_ms, 500);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/roster.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/roster.toml"));
    }

    #[test]
    fn test_overrides_win() {
        let config = Config::from_toml("port = 8080\n")
            .unwrap()
            .apply(ConfigOverrides {
                port: Some(9090),
                messages_file: Some(PathBuf::from("/tmp/board.json")),
                ..Default::default()
            });

        assert_eq!(config.port, 9090);
        assert_eq!(config.messages_file, PathBuf::from("/tmp/board.json"));
        assert_eq!(config.public_dir, PathBuf::from("public"));
    }
}

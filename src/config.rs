//! Configuration management for ftlink
//!
//! Values come from struct defaults, then an optional TOML file, then
//! `FTLINK_`-prefixed environment variables. The binaries apply their
//! command-line arguments on top.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base name of the config file looked up in the working directory (`ftlink.toml`).
pub const DEFAULT_CONFIG_FILE: &str = "ftlink";

/// Environment prefix, e.g. `FTLINK_SERVER__CONTROL_PORT=51000`.
pub const ENV_PREFIX: &str = "FTLINK";

/// Complete configuration for both binaries.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

/// Server side settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address the control listener binds to
    pub bind_address: String,

    /// Port for the control listener
    pub control_port: u16,

    /// Directory served to clients
    pub server_root: String,

    /// Largest command read from the control connection in one message
    pub max_command_length: usize,

    /// Connect attempts made for the data connection before giving up
    pub data_connect_attempts: u32,

    /// Delay after the first failed data connect; doubles on each retry
    pub data_connect_backoff_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            control_port: 50000,
            server_root: ".".to_string(),
            max_command_length: 128,
            data_connect_attempts: 5,
            data_connect_backoff_ms: 100,
        }
    }
}

/// Client side settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    /// Directory downloaded files are saved into
    pub download_dir: String,

    /// Largest control response read in one message
    pub response_buffer_size: usize,

    /// Longest accepted transfer header, newline included
    pub max_header_length: usize,

    /// Read chunk size on the data connection
    pub recv_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            download_dir: ".".to_string(),
            response_buffer_size: 128,
            max_header_length: 32,
            recv_buffer_size: 8192,
        }
    }
}

impl Settings {
    /// Load settings from `path` (required) or from `ftlink.toml` in the
    /// working directory (optional), with environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.server_root.is_empty() {
            return Err(ConfigError::Message("server_root cannot be empty".into()));
        }

        if self.server.max_command_length == 0 {
            return Err(ConfigError::Message(
                "max_command_length must be greater than 0".into(),
            ));
        }

        if self.server.data_connect_attempts == 0 {
            return Err(ConfigError::Message(
                "data_connect_attempts must be greater than 0".into(),
            ));
        }

        if self.client.download_dir.is_empty() {
            return Err(ConfigError::Message("download_dir cannot be empty".into()));
        }

        if self.client.response_buffer_size == 0 || self.client.recv_buffer_size == 0 {
            return Err(ConfigError::Message(
                "client buffer sizes must be greater than 0".into(),
            ));
        }

        // Must hold at least one digit and the newline.
        if self.client.max_header_length < 2 {
            return Err(ConfigError::Message(
                "max_header_length must be at least 2".into(),
            ));
        }

        Ok(())
    }
}

impl ServerConfig {
    /// Bind address and control port as a socket address string
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.control_port)
    }

    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }

    pub fn data_connect_backoff(&self) -> Duration {
        Duration::from_millis(self.data_connect_backoff_ms)
    }

    /// Where to reach the client's data listener: the control peer's IP.
    pub fn data_socket_for(&self, peer: SocketAddr, data_port: u16) -> SocketAddr {
        SocketAddr::new(peer.ip(), data_port)
    }
}

impl ClientConfig {
    pub fn download_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.download_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.server.max_command_length, 128);
        assert_eq!(settings.client.max_header_length, 32);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[server]\ncontrol_port = 51000\nserver_root = \"/srv/files\"\n\n[client]\nrecv_buffer_size = 1024\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.server.control_port, 51000);
        assert_eq!(settings.server.server_root_path(), PathBuf::from("/srv/files"));
        assert_eq!(settings.server.data_connect_attempts, 5);
        assert_eq!(settings.client.recv_buffer_size, 1024);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn rejects_zero_connect_attempts() {
        let mut settings = Settings::default();
        settings.server.data_connect_attempts = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn data_socket_uses_peer_ip() {
        let config = ServerConfig::default();
        let peer: SocketAddr = "10.0.0.7:40000".parse().unwrap();
        assert_eq!(
            config.data_socket_for(peer, 51000),
            "10.0.0.7:51000".parse::<SocketAddr>().unwrap()
        );
    }
}

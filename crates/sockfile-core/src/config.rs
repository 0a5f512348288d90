//! Configuration for the sockfile binaries.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $SOCKFILE_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/sockfile/config.toml
//!   3. ~/.config/sockfile/config.toml
//!
//! `SocketFile` itself never reads this; binaries pass the values in.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::socket_file::default_capacity;
use crate::transport::TcpConnector;

/// Port the listener uses unless told otherwise.
pub const DEFAULT_PORT: u16 = 65432;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SockfileConfig {
    pub client: ClientConfig,
    pub listener: ListenerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Listener address, numeric IPv4. Empty = must be given on the command line.
    pub server_addr: String,
    pub server_port: u16,
    /// Chunk capacity in bytes. 0 = platform default.
    pub capacity: usize,
    /// Delay between connection attempts in the demo.
    pub retry_delay_ms: u64,
    /// Upper bound on one connection attempt. 0 = platform default.
    pub connect_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    pub bind_ip: String,
    pub bind_port: u16,
    /// Directory for received files. Empty = current directory.
    pub path: PathBuf,
    pub prefix: String,
    /// File extension without the dot. Empty = no extension.
    pub ext: String,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: String::new(),
            server_port: DEFAULT_PORT,
            capacity: 0,
            retry_delay_ms: 3000,
            connect_timeout_ms: 0,
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_ip: "0.0.0.0".to_string(),
            bind_port: DEFAULT_PORT,
            path: PathBuf::new(),
            prefix: "via_socket".to_string(),
            ext: "txt".to_string(),
        }
    }
}

impl ClientConfig {
    /// Effective chunk capacity.
    pub fn capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or_else(default_capacity)
    }

    /// TCP connector honouring `connect_timeout_ms`.
    pub fn connector(&self) -> TcpConnector {
        match self.connect_timeout_ms {
            0 => TcpConnector::new(),
            ms => TcpConnector::new().with_connect_timeout(Duration::from_millis(ms)),
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("sockfile")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl SockfileConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_file(&Self::file_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(SockfileConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("SOCKFILE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write the defaults to `path` unless something is already there.
    pub fn write_default_if_missing(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))?;
        }
        let text = toml::to_string_pretty(&SockfileConfig::default())
            .map_err(ConfigError::SerializeFailed)?;
        std::fs::write(path, text).map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))
    }

    /// Apply SOCKFILE_* overrides. `lookup` is `std::env::var` in production.
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SOCKFILE_CLIENT__SERVER_ADDR") {
            self.client.server_addr = v;
        }
        if let Some(p) = lookup("SOCKFILE_CLIENT__SERVER_PORT").and_then(|v| v.parse().ok()) {
            self.client.server_port = p;
        }
        if let Some(c) = lookup("SOCKFILE_CLIENT__CAPACITY").and_then(|v| v.parse().ok()) {
            self.client.capacity = c;
        }
        let timeout = lookup("SOCKFILE_CLIENT__CONNECT_TIMEOUT_MS").and_then(|v| v.parse().ok());
        if let Some(t) = timeout {
            self.client.connect_timeout_ms = t;
        }
        if let Some(v) = lookup("SOCKFILE_LISTENER__BIND_IP") {
            self.listener.bind_ip = v;
        }
        if let Some(p) = lookup("SOCKFILE_LISTENER__BIND_PORT").and_then(|v| v.parse().ok()) {
            self.listener.bind_port = p;
        }
        if let Some(v) = lookup("SOCKFILE_LISTENER__PATH") {
            self.listener.path = PathBuf::from(v);
        }
    }
}

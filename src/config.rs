//! Exporter configuration.
//!
//! Settings come from command-line flags, optionally layered over a TOML
//! file. An explicit flag always wins over the file, and the file wins
//! over the built-in defaults.

use crate::digest::{Credentials, NonceCountFormat};
use crate::metrics::DEFAULT_METRICS_PATH;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default listen address. A bare `:port` binds every interface.
pub const DEFAULT_LISTEN_ADDRESS: &str = ":5896";
/// Default device username.
pub const DEFAULT_USERNAME: &str = "root";
/// Default device password.
pub const DEFAULT_PASSWORD: &str = "root";
/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Command-line arguments.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "jasminer-exporter")]
#[command(about = "Prometheus exporter for Jasminer mining rigs")]
#[command(version)]
pub struct Cli {
    /// Address to listen on for web interface and telemetry [default: :5896]
    #[arg(long)]
    pub listen_address: Option<String>,

    /// Path under which to expose metrics [default: /metrics]
    #[arg(long)]
    pub telemetry_path: Option<String>,

    /// URI of the Jasminer dashboard, e.g. http://192.168.1.50
    #[arg(long)]
    pub jasminer_uri: Option<String>,

    /// Jasminer authentication username [default: root]
    #[arg(long)]
    pub auth_username: Option<String>,

    /// Jasminer authentication password [default: root]
    #[arg(long)]
    pub auth_password: Option<String>,

    /// Timeout for each HTTP request to the device, in seconds [default: 10]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// How the digest nonce count is rendered [default: decimal]
    #[arg(long, value_enum)]
    pub nonce_count_format: Option<NonceCountFormat>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Jasminer URI required (--jasminer-uri)")]
    MissingUri,
    #[error("invalid Jasminer URI {0:?} (expected http:// or https://)")]
    InvalidUri(String),
    #[error("invalid listen address {0:?}")]
    InvalidListenAddress(String),
    #[error("invalid telemetry path {0:?} (must start with / and not be /)")]
    InvalidTelemetryPath(String),
    #[error("timeout must be at least one second")]
    InvalidTimeout,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub exporter: ExporterSection,
    /// Device connection settings.
    #[serde(default)]
    pub device: DeviceSection,
}

/// `[exporter]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExporterSection {
    /// Listen address, e.g. `:5896` or `127.0.0.1:9100`.
    pub listen_address: Option<String>,
    /// Metrics path.
    pub telemetry_path: Option<String>,
}

/// `[device]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeviceSection {
    /// Device base URI.
    pub uri: Option<String>,
    /// Digest username.
    pub username: Option<String>,
    /// Digest password.
    pub password: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Nonce count rendering.
    pub nonce_count_format: Option<NonceCountFormat>,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Fully resolved exporter configuration.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Socket the HTTP server binds.
    pub listen_addr: SocketAddr,
    /// Path serving the exposition.
    pub metrics_path: String,
    /// Device base URI.
    pub device_uri: String,
    /// Digest credentials.
    pub credentials: Credentials,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Nonce count rendering.
    pub nonce_count_format: NonceCountFormat,
}

impl ExporterConfig {
    /// Resolves the configuration, reading `--config` when given.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merges flags over a parsed file and validates the result.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let FileConfig { exporter, device } = file;

        let device_uri = cli
            .jasminer_uri
            .clone()
            .or(device.uri)
            .filter(|uri| !uri.trim().is_empty())
            .ok_or(ConfigError::MissingUri)?;
        if !(device_uri.starts_with("http://") || device_uri.starts_with("https://")) {
            return Err(ConfigError::InvalidUri(device_uri));
        }

        let listen_address = cli
            .listen_address
            .clone()
            .or(exporter.listen_address)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.to_string());

        let metrics_path = cli
            .telemetry_path
            .clone()
            .or(exporter.telemetry_path)
            .unwrap_or_else(|| DEFAULT_METRICS_PATH.to_string());
        if !metrics_path.starts_with('/') || metrics_path == "/" {
            return Err(ConfigError::InvalidTelemetryPath(metrics_path));
        }

        let timeout_secs = cli
            .timeout_secs
            .or(device.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let username = cli
            .auth_username
            .clone()
            .or(device.username)
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let password = cli
            .auth_password
            .clone()
            .or(device.password)
            .unwrap_or_else(|| DEFAULT_PASSWORD.to_string());

        Ok(Self {
            listen_addr: parse_listen_address(&listen_address)?,
            metrics_path,
            device_uri,
            credentials: Credentials::new(username, password),
            timeout: Duration::from_secs(timeout_secs),
            nonce_count_format: cli
                .nonce_count_format
                .or(device.nonce_count_format)
                .unwrap_or_default(),
        })
    }
}

/// Parses `host:port`, accepting a bare `:port` for all interfaces.
pub fn parse_listen_address(addr: &str) -> Result<SocketAddr, ConfigError> {
    let full = match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => addr.to_string(),
    };
    full.parse()
        .map_err(|_| ConfigError::InvalidListenAddress(addr.to_string()))
}

//! Relay configuration
//!
//! Loaded once at startup from a JSON file:
//!
//! ```
//! use newsrelay::Config;
//!
//! let config = Config::from_json(r#"{
//!     "backends": [{"type": "nntp", "name": "source", "server": "news.example.com"}],
//!     "services": [{"type": "nntp", "port": 1119}]
//! }"#).unwrap();
//! assert_eq!(config.backends[0].port(), 119);
//! ```

use crate::error::{NntpError, Result};
use crate::types::NNTP_TYPE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default plain NNTP port
pub const DEFAULT_PORT: u16 = 119;
/// Default implicit-TLS NNTP port
pub const DEFAULT_TLS_PORT: u16 = 563;
/// Default size of the locally materialized group working set
pub const DEFAULT_SYNC_GROUPS: usize = 10;

fn default_kind() -> String {
    NNTP_TYPE.to_string()
}

fn default_sync_groups() -> usize {
    DEFAULT_SYNC_GROUPS
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_database() -> String {
    "newsrelay.db".to_string()
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub debug: bool,
    /// SQLite database path
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    /// Downstream reader accounts seeded into storage
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// One upstream NNTP server to sync from
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// Backend name; becomes the `source` of every group it provides
    pub name: String,
    /// Upstream hostname
    pub server: String,
    /// Upstream port; `0` picks the default for the transport
    #[serde(default)]
    pub port: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pass: String,
    /// Use implicit TLS
    #[serde(default)]
    pub tls: bool,
    /// Accept any upstream certificate
    ///
    /// **Security Warning:** disables certificate validation. Only for
    /// servers you trust on a secure network.
    #[serde(default)]
    pub allow_insecure_tls: bool,
    /// How many subscriptions are materialized as local groups
    #[serde(default = "default_sync_groups")]
    pub sync_groups: usize,
}

impl BackendConfig {
    /// Create a configuration for a plain connection on the standard port (119)
    pub fn plain(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            kind: default_kind(),
            name: name.into(),
            server: server.into(),
            port: 0,
            user: String::new(),
            pass: String::new(),
            tls: false,
            allow_insecure_tls: false,
            sync_groups: DEFAULT_SYNC_GROUPS,
        }
    }

    /// Create a configuration for an implicit-TLS connection on port 563
    pub fn tls(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            tls: true,
            ..Self::plain(name, server)
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.user = user.into();
        self.pass = pass.into();
        self
    }

    /// Effective port, applying the transport default when unset
    pub fn port(&self) -> u16 {
        match (self.port, self.tls) {
            (0, true) => DEFAULT_TLS_PORT,
            (0, false) => DEFAULT_PORT,
            (port, _) => port,
        }
    }

    /// `host:port` dial address
    pub fn address(&self) -> String {
        format!("{}:{}", self.server, self.port())
    }

    /// Whether AUTHINFO should be sent after connecting
    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty()
    }
}

/// One downstream listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServiceConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            kind: default_kind(),
            host: host.into(),
            port,
        }
    }

    /// `host:port` listen address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reader account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub name: String,
    pub pass: String,
}

impl Config {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            NntpError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        for backend in &self.backends {
            if backend.kind != NNTP_TYPE {
                return Err(NntpError::Config(format!(
                    "backend {}: unsupported type {:?}",
                    backend.name, backend.kind
                )));
            }
            if backend.name.is_empty() || backend.name.contains('.') {
                return Err(NntpError::Config(format!(
                    "backend name {:?} must be non-empty and contain no dots",
                    backend.name
                )));
            }
            if backend.server.is_empty() {
                return Err(NntpError::Config(format!(
                    "backend {}: server is required",
                    backend.name
                )));
            }
        }
        for service in &self.services {
            if service.kind != NNTP_TYPE {
                return Err(NntpError::Config(format!(
                    "service {}: unsupported type {:?}",
                    service.address(),
                    service.kind
                )));
            }
        }
        Ok(())
    }
}

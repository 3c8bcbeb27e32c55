//! Configuration types for the CareBot MCP server.
//!
//! Configuration is loaded from an optional YAML file (`carebot.yaml`) and
//! overridden by environment variables. The backend token can be given
//! inline, via `token_env` indirection, or through the `ADMIN_ACCESS_TOKEN`
//! environment variable.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use std::time::Duration;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file was not valid YAML.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Complete CareBot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarebotConfig {
    /// DBOps backend connection.
    #[serde(default)]
    pub backend: BackendConfig,

    /// MCP server settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Cache TTL settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl CarebotConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Apply environment variable overrides (`DB_OPS_URL`, `ADMIN_ACCESS_TOKEN`).
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("DB_OPS_URL") {
            self.backend.base_url = url;
        }
        if let Ok(token) = std::env::var("ADMIN_ACCESS_TOKEN") {
            self.backend.token = Some(token);
        }
    }
}

/// Connection settings for the DBOps backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every call.
    #[serde(default)]
    pub token: Option<String>,

    /// Name of an environment variable holding the token. Takes precedence
    /// over the inline `token` when the variable is set.
    #[serde(default)]
    pub token_env: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            token_env: None,
        }
    }
}

impl BackendConfig {
    /// Resolve the bearer token, following the `token_env` indirection.
    ///
    /// A missing token is not an error: the client will send unauthenticated
    /// requests and let the backend reject them.
    pub fn resolve_token(&self) -> Option<String> {
        if let Some(var) = &self.token_env {
            if let Ok(value) = std::env::var(var) {
                return Some(value);
            }
        }
        self.token.clone()
    }
}

/// Configuration for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Transport type: "stdio" or "http".
    #[serde(default)]
    pub transport: Transport,

    /// HTTP host (only used when transport is HTTP).
    #[serde(default = "default_http_host")]
    pub host: String,

    /// HTTP port (only used when transport is HTTP).
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}

impl McpConfig {
    /// Check if using HTTP transport.
    pub fn is_http(&self) -> bool {
        self.transport == Transport::Http
    }

    /// Check if using stdio transport.
    pub fn is_stdio(&self) -> bool {
        self.transport == Transport::Stdio
    }
}

/// MCP transport type.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Standard input/output transport (for Claude Desktop, etc.).
    #[default]
    Stdio,
    /// HTTP transport.
    Http,
}

/// TTL settings for the entity listing caches.
///
/// Doctors change rarely and cache long; patients change through
/// registration and cache short; clinics are near-static.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Staff registry TTL in seconds.
    #[serde(default = "default_doctors_ttl")]
    pub doctors_ttl_secs: u64,

    /// Patient registry TTL in seconds.
    #[serde(default = "default_patients_ttl")]
    pub patients_ttl_secs: u64,

    /// Clinic listing TTL in seconds.
    #[serde(default = "default_clinics_ttl")]
    pub clinics_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            doctors_ttl_secs: default_doctors_ttl(),
            patients_ttl_secs: default_patients_ttl(),
            clinics_ttl_secs: default_clinics_ttl(),
        }
    }
}

impl CacheConfig {
    /// Staff registry TTL.
    pub fn doctors_ttl(&self) -> Duration {
        Duration::from_secs(self.doctors_ttl_secs)
    }

    /// Patient registry TTL.
    pub fn patients_ttl(&self) -> Duration {
        Duration::from_secs(self.patients_ttl_secs)
    }

    /// Clinic listing TTL.
    pub fn clinics_ttl(&self) -> Duration {
        Duration::from_secs(self.clinics_ttl_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_doctors_ttl() -> u64 {
    7200
}

fn default_patients_ttl() -> u64 {
    600
}

fn default_clinics_ttl() -> u64 {
    86400
}

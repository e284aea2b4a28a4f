// src/config.rs

//! Manages client configuration: loading, defaulting, and validation.
//!
//! The configuration is passed explicitly once at `Manager` construction;
//! there are no ambient process-wide defaults.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

/// Bounds and timeouts for the protocol engine.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LimitsConfig {
    /// The timeout for the initial TCP connection, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// The idle-read timeout, in seconds, applied only to reads that allow
    /// timing out. `0` disables it: reads block until data or disconnect.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// The maximum number of entries accumulated for one list response.
    /// `0` disables the check.
    #[serde(default = "default_max_list_events")]
    pub max_list_events: usize,
}

fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_read_timeout_secs() -> u64 {
    0
}
fn default_max_list_events() -> usize {
    8192
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            max_list_events: default_max_list_events(),
        }
    }
}

impl LimitsConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }
}

/// Represents the final, validated client configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub limits: LimitsConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5038
}
fn default_username() -> String {
    "trunkline".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_username(),
            secret: String::new(),
            log_level: default_log_level(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates invariants a deserialized configuration may still violate.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(anyhow!("'host' must not be empty"));
        }
        if self.port == 0 {
            return Err(anyhow!("'port' must be non-zero"));
        }
        if self.username.is_empty() {
            return Err(anyhow!("'username' must not be empty"));
        }
        Ok(())
    }
}

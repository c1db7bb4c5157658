use crate::constants::{
    DEFAULT_AUTH_TIMEOUT_SECS, DEFAULT_GREETING, DEFAULT_LISTEN_ADDRESS,
    DEFAULT_PASSIVE_PORT_END, DEFAULT_PASSIVE_PORT_START, DEFAULT_USERS_FILE,
};
use crate::core_tls::TlsConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    /// Address advertised in PASV replies. Empty means the control socket's local address.
    pub pasv_address: String,
    pub passive_port_start: u16,
    pub passive_port_end: u16,
    pub greeting: Option<String>,
    pub users_file: String,
    pub auth_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub tls: TlsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from(DEFAULT_LISTEN_ADDRESS),
            pasv_address: String::new(),
            passive_port_start: DEFAULT_PASSIVE_PORT_START,
            passive_port_end: DEFAULT_PASSIVE_PORT_END,
            greeting: Some(String::from(DEFAULT_GREETING)),
            users_file: String::from(DEFAULT_USERS_FILE),
            auth_timeout_secs: DEFAULT_AUTH_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let config = Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Startup errors. Any of these aborts the process.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credentials: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid credential record: {0}")]
    InvalidRecord(String),

    #[error("Invalid passive port range {start}-{end}")]
    InvalidPortRange { start: u16, end: u16 },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to prepare credential verifier: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

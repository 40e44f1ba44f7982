//! Environment-variable configuration (component I).
//!
//! `envy` deserializes the process environment into [`RawConfig`] — a flat,
//! all-`String`-and-primitive struct whose field names map onto the
//! upper-case env vars listed in the external interfaces section. CSV
//! splitting and numeric parsing, which `envy` alone can't do, happen in
//! [`Config::from_env`] afterwards, mirroring what the original
//! `go-envconfig`-based loader did natively.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration from the environment: {0}")]
    Env(#[from] envy::Error),

    #[error("BLOCKS entry {raw:?} is not a valid u64: {source}")]
    InvalidBlock {
        raw: String,
        source: std::num::ParseIntError,
    },

    #[error("ADDRESSES is empty after splitting")]
    EmptyAddresses,

    #[error("invalid URL in configuration: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    addresses: String,
    blocks: String,
    db_username: String,
    db_password: String,
    db_name: String,
    #[serde(default = "default_db_host")]
    db_host: String,
    #[serde(default = "default_db_port")]
    db_port: u16,
    #[serde(default = "default_base_url")]
    base_api_base_url: String,
    #[serde(default = "default_base_debug_url")]
    base_api_base_debug_url: String,
    #[serde(default = "default_api_port")]
    api_port: u16,
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_base_url() -> String {
    "https://base-rpc.publicnode.com".to_string()
}

fn default_base_debug_url() -> String {
    "https://docs-demo.base-mainnet.quiknode.pro".to_string()
}

fn default_api_port() -> u16 {
    3000
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub username: String,
    pub password: String,
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl DbConfig {
    /// Mirrors the original's DSN format, `connect_timeout=5` included.
    pub fn dsn(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?connect_timeout=5",
            self.username, self.password, self.host, self.port, self.name
        )
    }
}

#[derive(Debug, Clone)]
pub struct BaseApiConfig {
    pub base_url: Url,
    pub base_debug_url: Url,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Not yet lowercased — casing normalisation happens once, in
    /// `Watchlist::new`, per the two-chokepoint policy.
    pub addresses: Vec<String>,
    pub blocks: Vec<u64>,
    pub db: DbConfig,
    pub base_api: BaseApiConfig,
    pub api_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let raw: RawConfig = envy::from_env()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Config, ConfigError> {
        let addresses: Vec<String> = raw
            .addresses
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if addresses.is_empty() {
            return Err(ConfigError::EmptyAddresses);
        }

        let blocks = raw
            .blocks
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<u64>().map_err(|source| ConfigError::InvalidBlock {
                    raw: s.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<u64>, ConfigError>>()?;

        Ok(Config {
            addresses,
            blocks,
            db: DbConfig {
                username: raw.db_username,
                password: raw.db_password,
                name: raw.db_name,
                host: raw.db_host,
                port: raw.db_port,
            },
            base_api: BaseApiConfig {
                base_url: Url::parse(&raw.base_api_base_url)?,
                base_debug_url: Url::parse(&raw.base_api_base_debug_url)?,
            },
            api_port: raw.api_port,
        })
    }
}

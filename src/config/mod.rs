//! Process configuration from environment variables (`.env` is loaded by the binary).

mod database;

pub use database::{resolve_data_source, DataSource, DatabaseKind, DEFAULT_DATABASE_NAME, DEFAULT_DATA_DIR};

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5100";
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub data_source: DataSource,
    pub bind_addr: SocketAddr,
    pub body_limit: usize,
    /// Seed the reference owners into an empty database at startup.
    pub seed: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an explicit variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_source = match get("DATABASE_URL") {
            Some(url) => DataSource::from_url(&url)?,
            None => {
                let kind = match get("BANKING_USE_DATABASE") {
                    Some(v) => v.parse::<DatabaseKind>()?,
                    None => DatabaseKind::Sqlite,
                };
                let name = get("BANKING_DATABASE_NAME").unwrap_or_else(|| DEFAULT_DATABASE_NAME.into());
                let data_dir = PathBuf::from(get("BANKING_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.into()));
                resolve_data_source(kind, &name, &data_dir)?
            }
        };

        let bind_addr = get("BANKING_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.into())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BANKING_BIND_ADDR",
                message: e.to_string(),
            })?;

        let body_limit = match get("BANKING_BODY_LIMIT") {
            Some(v) => v.trim().parse::<usize>().map_err(|e| ConfigError::Invalid {
                key: "BANKING_BODY_LIMIT",
                message: e.to_string(),
            })?,
            None => DEFAULT_BODY_LIMIT,
        };

        let seed = matches!(
            get("BANKING_SEED").as_deref().map(str::trim),
            Some("1") | Some("true") | Some("yes")
        );

        Ok(AppConfig {
            data_source,
            bind_addr,
            body_limit,
            seed,
        })
    }
}

//! Data source resolution from the configured database kind and name.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_DATABASE_NAME: &str = "WebApi04";
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Database kinds accepted by `BANKING_USE_DATABASE`. Only `Sqlite` and `Memory` can be served.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatabaseKind {
    Sqlite,
    Memory,
    LocalDb,
    SqlServer,
}

impl FromStr for DatabaseKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(DatabaseKind::Sqlite),
            "memory" | "inmemory" => Ok(DatabaseKind::Memory),
            "localdb" => Ok(DatabaseKind::LocalDb),
            "sqlserver" => Ok(DatabaseKind::SqlServer),
            _ => Err(ConfigError::Invalid {
                key: "BANKING_USE_DATABASE",
                message: format!("unknown database kind `{}`", s),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    /// SQLite database file, created on first connect.
    File(PathBuf),
    /// Private in-memory database living as long as its pool.
    Memory,
}

impl DataSource {
    pub fn url(&self) -> String {
        match self {
            DataSource::File(path) => format!("sqlite://{}", path.display()),
            DataSource::Memory => "sqlite::memory:".to_string(),
        }
    }

    /// Parses an explicit `sqlite:` URL.
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let rest = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .ok_or_else(|| ConfigError::UnsupportedDatabase(url.to_string()))?;
        let path = rest.split('?').next().unwrap_or_default();
        if path.is_empty() || path == ":memory:" {
            return Ok(DataSource::Memory);
        }
        Ok(DataSource::File(PathBuf::from(path)))
    }
}

/// Resolves the data source for `kind`: `<data_dir>/<name>.db` for `Sqlite`, an in-memory
/// database for `Memory`. Server-based kinds are rejected.
pub fn resolve_data_source(
    kind: DatabaseKind,
    name: &str,
    data_dir: &Path,
) -> Result<DataSource, ConfigError> {
    match kind {
        DatabaseKind::Sqlite => {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "BANKING_DATABASE_NAME",
                    message: "must not be empty".into(),
                });
            }
            Ok(DataSource::File(data_dir.join(format!("{}.db", name))))
        }
        DatabaseKind::Memory => Ok(DataSource::Memory),
        DatabaseKind::LocalDb | DatabaseKind::SqlServer => {
            Err(ConfigError::UnsupportedDatabase(format!("{:?}", kind)))
        }
    }
}

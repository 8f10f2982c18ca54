//! Named generator configurations.
//!
//! A configuration is a TOML file named `<name>.toml` inside the
//! configuration directory (by convention `.qlgen/` at the project root).
//!
//! ```toml
//! dialect = "static"
//! driver = "standard"
//!
//! [tables.profiles]
//! columns = [
//!     { name = "id", type = "int8", primary_key = true },
//!     { name = "email", type = "text", nullable = true },
//! ]
//!
//! [queries.active_profiles]
//! sql = "SELECT id, email FROM profiles WHERE active"
//! columns = [{ name = "id", type = "int8" }, { name = "email", type = "text", nullable = true }]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Directory, relative to the project root, holding named configurations.
pub const CONFIG_DIR: &str = ".qlgen";

/// Configuration name used when none is given.
pub const DEFAULT_CONFIG: &str = "default";

/// A parsed generator configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Dialect name (`static` is the only built-in dialect).
    #[serde(default = "default_dialect")]
    pub dialect: String,
    /// Driver name (`standard` is the only built-in driver).
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Table schemas, keyed by table name.
    #[serde(default)]
    pub tables: BTreeMap<String, TableDef>,
    /// Named query schemas.
    #[serde(default)]
    pub queries: BTreeMap<String, QueryDef>,
}

fn default_dialect() -> String {
    "static".to_string()
}

fn default_driver() -> String {
    "standard".to_string()
}

/// Columns of a table.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TableDef {
    pub columns: Vec<ColumnDef>,
}

/// A query together with the columns it produces.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct QueryDef {
    pub sql: String,
    pub columns: Vec<ColumnDef>,
}

/// A single column as written in the configuration file.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ColumnDef {
    pub name: String,
    /// SQL type name (e.g. `int8`, `text`).
    #[serde(rename = "type")]
    pub sql_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
}

/// Errors raised while locating or reading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration name `{0}`")]
    InvalidName(String),
    #[error("failed to read configuration {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Path of the configuration `name` inside `dir`.
    pub fn path(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{name}.toml"))
    }

    /// Load the configuration `name` from `dir`.
    ///
    /// Names are plain file stems; anything that could escape `dir` is
    /// rejected before touching the filesystem.
    pub fn load(dir: &Path, name: &str) -> Result<Self, ConfigError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(ConfigError::InvalidName(name.to_string()));
        }

        let path = Self::path(dir, name);
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        Self::parse(&text, &path)
    }

    /// Parse configuration text. `path` is only used for error reporting.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

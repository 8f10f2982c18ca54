//! Loaded generator context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::dialect::{Dialect, DialectError, StaticDialect};
use crate::driver::{Driver, StandardDriver};

/// A named configuration with its dialect and driver instantiated.
///
/// Cheap to clone: the collaborators are shared behind `Arc`.
#[derive(Clone)]
pub struct GeneratorContext {
    name: String,
    config_path: PathBuf,
    dialect: Arc<dyn Dialect>,
    driver: Arc<dyn Driver>,
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unknown dialect `{0}`")]
    UnknownDialect(String),
    #[error("unknown driver `{0}`")]
    UnknownDriver(String),
    #[error("dialect `{dialect}` rejected the configuration")]
    Dialect {
        dialect: String,
        #[source]
        source: DialectError,
    },
}

impl GeneratorContext {
    /// Wrap already constructed collaborators.
    pub fn new(
        name: impl Into<String>,
        dialect: Arc<dyn Dialect>,
        driver: Arc<dyn Driver>,
    ) -> Self {
        let name = name.into();
        GeneratorContext {
            config_path: PathBuf::from(format!("{name}.toml")),
            name,
            dialect,
            driver,
        }
    }

    /// Load configuration `name` from `config_dir` and instantiate the
    /// dialect and driver it selects.
    pub fn load(config_dir: &Path, name: &str) -> Result<Self, ContextError> {
        let config = Config::load(config_dir, name)?;

        let dialect: Arc<dyn Dialect> = match config.dialect.as_str() {
            StaticDialect::NAME => Arc::new(StaticDialect::from_config(&config).map_err(
                |source| ContextError::Dialect {
                    dialect: config.dialect.clone(),
                    source,
                },
            )?),
            other => return Err(ContextError::UnknownDialect(other.to_string())),
        };

        let driver: Arc<dyn Driver> = match config.driver.as_str() {
            StandardDriver::NAME => Arc::new(StandardDriver::new()),
            other => return Err(ContextError::UnknownDriver(other.to_string())),
        };

        tracing::debug!(
            config = name,
            dialect = dialect.name(),
            driver = driver.name(),
            "loaded generator context"
        );

        Ok(GeneratorContext {
            name: name.to_string(),
            config_path: Config::path(config_dir, name),
            dialect,
            driver,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }
}

impl std::fmt::Debug for GeneratorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorContext")
            .field("name", &self.name)
            .field("config_path", &self.config_path)
            .field("dialect", &self.dialect.name())
            .field("driver", &self.driver.name())
            .finish()
    }
}

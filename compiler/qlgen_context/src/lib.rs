//! qlgen Generator Context
//!
//! Everything a directive needs from the outside world while it renders a
//! fragment:
//!
//! - [`Config`]: named TOML configuration (`.qlgen/<name>.toml`)
//! - [`Dialect`]: column discovery and SQL rendering for one database flavour
//! - [`Driver`]: nullable wire representation of Rust scalar types
//! - [`GeneratorContext`]: a loaded configuration with its dialect and driver
//!
//! The dialect and driver are collaborators: the generator only ever talks to
//! the traits. [`StaticDialect`] and [`StandardDriver`] are the reference
//! implementations selected by the configuration file.

mod config;
mod context;
mod dialect;
mod driver;

pub use config::{ColumnDef, Config, ConfigError, QueryDef, TableDef, CONFIG_DIR, DEFAULT_CONFIG};
pub use context::{ContextError, GeneratorContext};
pub use dialect::{ColumnInfo, Dialect, DialectError, InsertSpec, StaticDialect};
pub use driver::{Driver, NullableType, StandardDriver};

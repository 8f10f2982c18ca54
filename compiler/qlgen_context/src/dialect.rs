//! Database dialects.
//!
//! A dialect answers two questions for the generator: which columns does a
//! table (or query) produce, and what SQL text implements an insert or a
//! keyed select. Real dialects talk to a live database; [`StaticDialect`]
//! answers from the schema written in the configuration file.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::config::{ColumnDef, Config};

/// A column as seen by the generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Rust type of the non-null value (e.g. `i64`, `String`).
    pub ty: String,
    pub nullable: bool,
    pub primary_key: bool,
}

/// Parameters of a (possibly multi-row) insert statement.
#[derive(Clone, Copy, Debug)]
pub struct InsertSpec<'a> {
    /// Number of value tuples.
    pub rows: usize,
    /// Placeholder offset; the first bound placeholder is `offset + 1`.
    pub offset: usize,
    pub table: &'a str,
    /// Verbatim conflict clause (e.g. `ON CONFLICT (id) DO NOTHING`).
    pub conflict: Option<&'a str>,
    /// Columns listed in the insert, in order.
    pub columns: &'a [String],
    /// Columns returned by the statement.
    pub projection: &'a [String],
    /// Columns rendered as `DEFAULT` instead of a placeholder.
    pub defaults: &'a [String],
}

/// Column discovery and SQL rendering for one database flavour.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &str;

    fn column_information_for_table(&self, table: &str) -> Result<Vec<ColumnInfo>, DialectError>;

    fn column_information_for_query(&self, query: &str) -> Result<Vec<ColumnInfo>, DialectError>;

    fn insert(&self, spec: &InsertSpec<'_>) -> String;

    /// `SELECT <columns> FROM <table> WHERE <predicate> = <placeholder> AND ...`
    fn select(&self, table: &str, columns: &[String], predicates: &[String]) -> String;
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DialectError {
    #[error("unknown table `{0}`")]
    UnknownTable(String),
    #[error("unknown query `{0}`")]
    UnknownQuery(String),
    #[error("column `{column}` has unsupported type `{sql_type}`")]
    UnsupportedType { column: String, sql_type: String },
}

/// Dialect backed by the schema declared in the configuration file.
///
/// Renders PostgreSQL-style SQL with `$n` placeholders.
#[derive(Clone, Debug, Default)]
pub struct StaticDialect {
    tables: BTreeMap<String, Vec<ColumnInfo>>,
    queries: Vec<StaticQuery>,
}

#[derive(Clone, Debug)]
struct StaticQuery {
    name: String,
    sql: String,
    columns: Vec<ColumnInfo>,
}

impl StaticDialect {
    pub const NAME: &'static str = "static";

    /// Build the dialect from a configuration, resolving every SQL type up
    /// front so unsupported columns are reported once, at load time.
    pub fn from_config(config: &Config) -> Result<Self, DialectError> {
        let mut tables = BTreeMap::new();
        for (name, table) in &config.tables {
            tables.insert(name.clone(), convert_columns(&table.columns)?);
        }

        let mut queries = Vec::with_capacity(config.queries.len());
        for (name, query) in &config.queries {
            queries.push(StaticQuery {
                name: name.clone(),
                sql: query.sql.trim().to_string(),
                columns: convert_columns(&query.columns)?,
            });
        }

        Ok(StaticDialect { tables, queries })
    }
}

impl Dialect for StaticDialect {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn column_information_for_table(&self, table: &str) -> Result<Vec<ColumnInfo>, DialectError> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| DialectError::UnknownTable(table.to_string()))
    }

    fn column_information_for_query(&self, query: &str) -> Result<Vec<ColumnInfo>, DialectError> {
        let query = query.trim();
        self.queries
            .iter()
            .find(|q| q.name == query || q.sql == query)
            .map(|q| q.columns.clone())
            .ok_or_else(|| DialectError::UnknownQuery(query.to_string()))
    }

    fn insert(&self, spec: &InsertSpec<'_>) -> String {
        let mut placeholder = spec.offset;
        let mut tuples = Vec::with_capacity(spec.rows);
        for _ in 0..spec.rows {
            let values: Vec<String> = spec
                .columns
                .iter()
                .map(|column| {
                    if spec.defaults.contains(column) {
                        "DEFAULT".to_string()
                    } else {
                        placeholder += 1;
                        format!("${placeholder}")
                    }
                })
                .collect();
            tuples.push(format!("({})", values.join(", ")));
        }

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            spec.table,
            spec.columns.join(", "),
            tuples.join(", ")
        );
        if let Some(conflict) = spec.conflict {
            let _ = write!(sql, " {conflict}");
        }
        if !spec.projection.is_empty() {
            let _ = write!(sql, " RETURNING {}", spec.projection.join(", "));
        }
        sql
    }

    fn select(&self, table: &str, columns: &[String], predicates: &[String]) -> String {
        let mut sql = format!("SELECT {} FROM {table}", columns.join(", "));
        for (i, predicate) in predicates.iter().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            let _ = write!(sql, " {keyword} {predicate} = ${}", i + 1);
        }
        sql
    }
}

fn convert_columns(columns: &[ColumnDef]) -> Result<Vec<ColumnInfo>, DialectError> {
    columns
        .iter()
        .map(|column| {
            let ty = rust_type(&column.sql_type).ok_or_else(|| DialectError::UnsupportedType {
                column: column.name.clone(),
                sql_type: column.sql_type.clone(),
            })?;
            Ok(ColumnInfo {
                name: column.name.clone(),
                ty: ty.to_string(),
                nullable: column.nullable,
                primary_key: column.primary_key,
            })
        })
        .collect()
}

/// Rust type for a SQL type name.
fn rust_type(sql_type: &str) -> Option<&'static str> {
    let ty = match sql_type.trim().to_ascii_lowercase().as_str() {
        "bool" | "boolean" => "bool",
        "int2" | "smallint" | "smallserial" => "i16",
        "int4" | "int" | "integer" | "serial" => "i32",
        "int8" | "bigint" | "bigserial" => "i64",
        "float4" | "real" => "f32",
        "float8" | "double precision" => "f64",
        "text" | "varchar" | "character varying" | "char" | "uuid" | "citext" => "String",
        "bytea" => "Vec<u8>",
        _ => return None,
    };
    Some(ty)
}

//! `Insert` and `InsertBatch`: inserts of a row struct, returning a scanner
//! over the inserted rows.

use qlgen_context::InsertSpec;
use qlgen_eval::StructDef;

use super::{driver_type, fn_ident, ident, string_literal};
use crate::kind::DirectiveKind;
use crate::pattern::PatternParam;
use crate::registry::{Declaration, DirectiveDefinition, Fragment, FragmentError, GenerationEnv};

pub struct InsertDirective;

pub struct InsertBatchDirective;

struct InsertFragment {
    name: String,
    executor: PatternParam,
    record: PatternParam,
    output: String,
    table: String,
    defaults: Vec<String>,
    conflict: Option<String>,
    /// Rows per statement; `None` for a single-row insert.
    batch: Option<usize>,
}

impl DirectiveDefinition for InsertDirective {
    fn kind(&self) -> DirectiveKind {
        DirectiveKind::Insert
    }

    fn validate(&self, decl: &Declaration<'_>) -> Result<Box<dyn Fragment>, String> {
        validate_insert(decl, false)
    }
}

impl DirectiveDefinition for InsertBatchDirective {
    fn kind(&self) -> DirectiveKind {
        DirectiveKind::InsertBatch
    }

    fn validate(&self, decl: &Declaration<'_>) -> Result<Box<dyn Fragment>, String> {
        validate_insert(decl, true)
    }
}

fn validate_insert(decl: &Declaration<'_>, batched: bool) -> Result<Box<dyn Fragment>, String> {
    let pattern = decl.pattern()?;
    let output = pattern.output_ident()?.to_string();
    let (executor, rest) = pattern.split_executor()?;
    let record = match rest {
        [record] => record.clone(),
        _ => {
            return Err(format!(
                "insert pattern must take the executor and one record, found {} arguments",
                pattern.params.len()
            ))
        }
    };
    if record.ty.starts_with('&') {
        return Err("insert record must be written as a plain struct type".to_string());
    }

    let mut options = decl.options()?;
    let table = options.require_str("into")?;
    let defaults = options.take_all_str("default")?;
    let conflict = options.take_str("conflict")?;
    let batch = if batched {
        let size = options
            .take_int("batch")?
            .ok_or_else(|| "missing required option `batch`".to_string())?;
        if size == 0 {
            return Err("batch size must be at least 1".to_string());
        }
        Some(usize::try_from(size).map_err(|_| format!("batch size {size} is too large"))?)
    } else {
        None
    };
    options.finish()?;

    Ok(Box::new(InsertFragment {
        name: fn_ident(&decl.name),
        executor: executor.clone(),
        record,
        output,
        table,
        defaults,
        conflict,
        batch,
    }))
}

impl InsertFragment {
    /// Columns of the insert and the struct they come from.
    fn columns<'a>(&self, env: &'a GenerationEnv<'_>) -> Result<(&'a StructDef, Vec<String>), FragmentError> {
        let def = env
            .eval
            .lookup_struct(&self.record.ty)
            .ok_or_else(|| format!("type `{}` is not defined", self.record.ty))?;
        if def.fields.is_empty() {
            return Err(format!("struct `{}` has no named fields", def.name).into());
        }

        let table = env.dialect.column_information_for_table(&self.table)?;
        let columns: Vec<String> = def.fields.iter().map(|f| f.name.clone()).collect();
        for column in &columns {
            if !table.iter().any(|c| &c.name == column) {
                return Err(format!("table `{}` has no column `{column}`", self.table).into());
            }
        }
        for default in &self.defaults {
            if !columns.contains(default) {
                return Err(format!(
                    "default column `{default}` is not a field of `{}`",
                    def.name
                )
                .into());
            }
        }
        Ok((def, columns))
    }

    fn sql(&self, env: &GenerationEnv<'_>, rows: usize, columns: &[String]) -> String {
        env.dialect.insert(&InsertSpec {
            rows,
            offset: 0,
            table: &self.table,
            conflict: self.conflict.as_deref(),
            columns,
            projection: columns,
            defaults: &self.defaults,
        })
    }

    /// `&record.field` expressions for every non-default field.
    fn bound_fields(&self, env: &GenerationEnv<'_>, def: &StructDef, record: &str) -> Result<Vec<String>, String> {
        let mut bound = Vec::new();
        for field in &def.fields {
            if self.defaults.contains(&field.name) {
                continue;
            }
            let what = format!("field `{}`", field.name);
            let ty = driver_type(env.driver, field.base_type(), &what)?;
            bound.push(ty.encode(&format!("{record}.{}", ident(&field.name))));
        }
        Ok(bound)
    }
}

impl Fragment for InsertFragment {
    fn generate(&self, env: &GenerationEnv<'_>) -> Result<String, FragmentError> {
        let (def, columns) = self.columns(env)?;
        let executor = if self.executor.ty.starts_with('&') {
            self.executor.name.clone()
        } else {
            format!("&{}", self.executor.name)
        };
        let (name, output, record, ty) =
            (&self.name, &self.output, &self.record.name, &self.record.ty);
        let signature = format!("{}: {}", self.executor.name, self.executor.ty);

        let Some(batch) = self.batch else {
            let sql = string_literal(&self.sql(env, 1, &columns));
            let bound = self.bound_fields(env, def, record)?.join(", ");
            return Ok(format!(
                "pub fn {name}({signature}, {record}: &{ty}) -> Result<{output}, qlgen::Error> {{\n\
                 const QUERY: &str = {sql};\n\
                 {output}::query({executor}, QUERY, &[{bound}])\n\
                 }}"
            ));
        };

        let queries: Vec<String> = (1..=batch)
            .map(|rows| string_literal(&self.sql(env, rows, &columns)))
            .collect();
        let queries = queries.join(",\n");
        let bound = self.bound_fields(env, def, "record")?;
        let per_row = bound.len();
        let pushes: String = bound
            .iter()
            .map(|arg| format!("values.push({arg});\n"))
            .collect();
        Ok(format!(
            "pub fn {name}({signature}, {record}: &[{ty}]) -> Result<Vec<{output}>, qlgen::Error> {{\n\
             const QUERIES: [&str; {batch}] = [\n{queries}\n];\n\
             let mut results = Vec::with_capacity({record}.len().div_ceil({batch}));\n\
             for chunk in {record}.chunks({batch}) {{\n\
             let mut values: Vec<&dyn qlgen::ToSql> = Vec::with_capacity(chunk.len() * {per_row});\n\
             for record in chunk {{\n\
             {pushes}\
             }}\n\
             results.push({output}::query({executor}, QUERIES[chunk.len() - 1], &values)?);\n\
             }}\n\
             Ok(results)\n\
             }}"
        ))
    }
}

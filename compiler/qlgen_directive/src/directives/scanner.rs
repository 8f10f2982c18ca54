//! `Scanner`: an iterator decoding result rows into a struct, a scalar or a
//! tuple.

use std::fmt::Write;

use super::{driver_type, ident, string_literal, type_name};
use crate::kind::DirectiveKind;
use crate::pattern::PatternParam;
use crate::registry::{Declaration, DirectiveDefinition, Fragment, FragmentError, GenerationEnv};

pub struct ScannerDirective;

struct ScannerFragment {
    name: String,
    args: Vec<PatternParam>,
    comment: Option<String>,
}

impl DirectiveDefinition for ScannerDirective {
    fn kind(&self) -> DirectiveKind {
        DirectiveKind::Scanner
    }

    fn validate(&self, decl: &Declaration<'_>) -> Result<Box<dyn Fragment>, String> {
        let pattern = decl.pattern()?;
        if pattern.params.is_empty() {
            return Err("scanner pattern must take at least one argument".to_string());
        }
        if pattern.output.is_some() {
            return Err("scanner pattern may not declare a return type".to_string());
        }
        let mut options = decl.options()?;
        let comment = options.take_str("comment")?;
        options.finish()?;

        Ok(Box::new(ScannerFragment {
            name: type_name(&decl.name),
            args: pattern.params,
            comment,
        }))
    }
}

impl ScannerFragment {
    /// Item type and the expression building it from `row`.
    fn decoder(&self, env: &GenerationEnv<'_>) -> Result<(String, String), String> {
        if let [arg] = self.args.as_slice() {
            if let Some(def) = env.eval.lookup_struct(&arg.ty) {
                if def.fields.is_empty() {
                    return Err(format!("struct `{}` has no named fields", def.name));
                }
                let mut fields = Vec::with_capacity(def.fields.len());
                for field in &def.fields {
                    let column = ident(&field.name);
                    let value = column_value(env, &field.name, field.base_type(), field.is_optional())?;
                    fields.push(format!("{column}: {value}"));
                }
                return Ok((def.name.clone(), format!("{} {{ {} }}", def.name, fields.join(", "))));
            }
        }

        let mut types = Vec::with_capacity(self.args.len());
        let mut values = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            let (base, optional) = match arg.ty.strip_prefix("Option<").and_then(|t| t.strip_suffix('>')) {
                Some(inner) => (inner, true),
                None => (arg.ty.as_str(), false),
            };
            if env.driver.lookup_nullable_type(base).is_none() {
                if env.eval.lookup_struct(base).is_some() {
                    return Err(format!(
                        "struct argument `{}` must be the only scanner argument",
                        arg.name
                    ));
                }
                return Err(format!("type `{base}` is not defined"));
            }
            types.push(arg.ty.clone());
            values.push(column_value(env, &arg.name, base, optional)?);
        }

        Ok(match (types.as_slice(), values.as_slice()) {
            ([ty], [value]) => (ty.clone(), value.clone()),
            _ => (format!("({})", types.join(", ")), format!("({})", values.join(", "))),
        })
    }
}

/// Expression reading column `column` from `row`.
fn column_value(
    env: &GenerationEnv<'_>,
    column: &str,
    native: &str,
    optional: bool,
) -> Result<String, String> {
    let read = format!("row.get({})?", string_literal(column));
    if optional {
        // Nullable columns are read as-is.
        return Ok(read);
    }
    let what = format!("column `{column}`");
    Ok(driver_type(env.driver, native, &what)?.decode(&read, column))
}

impl Fragment for ScannerFragment {
    fn generate(&self, env: &GenerationEnv<'_>) -> Result<String, FragmentError> {
        let (item, build) = self.decoder(env)?;
        let name = &self.name;

        let mut out = String::new();
        match &self.comment {
            Some(comment) => {
                for line in comment.lines() {
                    let _ = writeln!(out, "/// {line}");
                }
            }
            None => {
                let _ = writeln!(out, "/// Rows decoded as `{item}`.");
            }
        }
        let _ = write!(
            out,
            "pub struct {name} {{\n\
             rows: qlgen::Rows,\n\
             }}\n\
             \n\
             impl {name} {{\n\
             pub fn new(rows: qlgen::Rows) -> Self {{\n\
             {name} {{ rows }}\n\
             }}\n\
             \n\
             pub fn query(q: &dyn qlgen::Queryer, sql: &str, args: &[&dyn qlgen::ToSql]) -> Result<Self, qlgen::Error> {{\n\
             q.query(sql, args).map(Self::new)\n\
             }}\n\
             \n\
             pub fn scan(row: &qlgen::Row) -> Result<{item}, qlgen::Error> {{\n\
             Ok({build})\n\
             }}\n\
             }}\n\
             \n\
             impl Iterator for {name} {{\n\
             type Item = Result<{item}, qlgen::Error>;\n\
             \n\
             fn next(&mut self) -> Option<Self::Item> {{\n\
             self.rows.next().map(|row| row.and_then(|row| Self::scan(&row)))\n\
             }}\n\
             }}"
        );
        Ok(out)
    }
}

//! `Structure`: a row struct for a table or query.

use std::fmt::Write;

use rustc_hash::FxHashSet;

use super::{driver_type, ident, is_identifier, type_name};
use crate::kind::DirectiveKind;
use crate::registry::{Declaration, DirectiveDefinition, Fragment, FragmentError, GenerationEnv};

pub struct StructureDirective;

enum Source {
    Table(String),
    Query(String),
}

struct StructureFragment {
    name: String,
    source: Source,
    comment: Option<String>,
}

impl DirectiveDefinition for StructureDirective {
    fn kind(&self) -> DirectiveKind {
        DirectiveKind::Structure
    }

    fn validate(&self, decl: &Declaration<'_>) -> Result<Box<dyn Fragment>, String> {
        decl.expect_no_params()?;
        let mut options = decl.options()?;
        let table = options.take_str("table")?;
        let query = options.take_str("query")?;
        let comment = options.take_str("comment")?;
        options.finish()?;

        let source = match (table, query) {
            (Some(table), None) => Source::Table(table),
            (None, Some(query)) => Source::Query(query),
            _ => return Err("exactly one of `table` or `query` is required".to_string()),
        };
        Ok(Box::new(StructureFragment {
            name: type_name(&decl.name),
            source,
            comment,
        }))
    }
}

impl Fragment for StructureFragment {
    fn generate(&self, env: &GenerationEnv<'_>) -> Result<String, FragmentError> {
        let columns = match &self.source {
            Source::Table(table) => env.dialect.column_information_for_table(table)?,
            Source::Query(query) => env.dialect.column_information_for_query(query)?,
        };
        if columns.is_empty() {
            return Err(format!("`{}` has no columns", self.name).into());
        }

        let mut out = String::new();
        if let Some(comment) = &self.comment {
            for line in comment.lines() {
                let _ = writeln!(out, "/// {line}");
            }
        }
        let _ = writeln!(out, "#[derive(Clone, Debug, Default, PartialEq)]");
        let _ = writeln!(out, "pub struct {} {{", self.name);

        let mut seen = FxHashSet::default();
        for column in &columns {
            if !is_identifier(&column.name) {
                return Err(format!("column `{}` is not a valid field name", column.name).into());
            }
            if !seen.insert(column.name.as_str()) {
                return Err(format!("column `{}` appears more than once", column.name).into());
            }
            let field = ident(&column.name);
            let what = format!("column `{}`", column.name);
            let ty = driver_type(env.driver, &column.ty, &what)?;
            let field_ty = if column.nullable { &ty.nullable } else { &ty.native };
            let _ = writeln!(out, "    pub {field}: {field_ty},");
        }
        out.push('}');
        Ok(out)
    }
}

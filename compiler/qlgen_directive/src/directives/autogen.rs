//! `QueryAutogen`: a keyed select generated from a table's columns.

use super::{fn_ident, query_function};
use crate::kind::DirectiveKind;
use crate::pattern::PatternParam;
use crate::registry::{Declaration, DirectiveDefinition, Fragment, FragmentError, GenerationEnv};

pub struct AutogenDirective;

struct AutogenFragment {
    name: String,
    executor: PatternParam,
    keys: Vec<PatternParam>,
    output: String,
    table: String,
}

impl DirectiveDefinition for AutogenDirective {
    fn kind(&self) -> DirectiveKind {
        DirectiveKind::QueryAutogen
    }

    fn validate(&self, decl: &Declaration<'_>) -> Result<Box<dyn Fragment>, String> {
        let pattern = decl.pattern()?;
        let output = pattern.output_ident()?.to_string();
        let (executor, keys) = pattern.split_executor()?;
        let mut options = decl.options()?;
        let table = options.require_str("from")?;
        options.finish()?;

        Ok(Box::new(AutogenFragment {
            name: fn_ident(&decl.name),
            executor: executor.clone(),
            keys: keys.to_vec(),
            output,
            table,
        }))
    }
}

impl Fragment for AutogenFragment {
    fn generate(&self, env: &GenerationEnv<'_>) -> Result<String, FragmentError> {
        let columns = env.dialect.column_information_for_table(&self.table)?;
        let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();

        let mut predicates = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            if !names.contains(&key.name) {
                return Err(format!("table `{}` has no column `{}`", self.table, key.name).into());
            }
            predicates.push(key.name.clone());
        }

        let sql = env.dialect.select(&self.table, &names, &predicates);
        let text = query_function(
            &self.name,
            &self.executor,
            &self.keys,
            &self.output,
            &sql,
            env.driver,
        )?;
        Ok(text)
    }
}

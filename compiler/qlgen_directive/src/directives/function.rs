//! `Function`: a query function returning a scanner.

use super::{fn_ident, query_function};
use crate::kind::DirectiveKind;
use crate::pattern::PatternParam;
use crate::registry::{Declaration, DirectiveDefinition, Fragment, FragmentError, GenerationEnv};

pub struct FunctionDirective;

struct FunctionFragment {
    name: String,
    executor: PatternParam,
    args: Vec<PatternParam>,
    output: String,
    query: String,
}

impl DirectiveDefinition for FunctionDirective {
    fn kind(&self) -> DirectiveKind {
        DirectiveKind::Function
    }

    fn validate(&self, decl: &Declaration<'_>) -> Result<Box<dyn Fragment>, String> {
        let pattern = decl.pattern()?;
        let output = pattern.output_ident()?.to_string();
        let (executor, args) = pattern.split_executor()?;
        let mut options = decl.options()?;
        let query = options.require_str("query")?;
        options.finish()?;

        Ok(Box::new(FunctionFragment {
            name: fn_ident(&decl.name),
            executor: executor.clone(),
            args: args.to_vec(),
            output,
            query,
        }))
    }
}

impl Fragment for FunctionFragment {
    fn generate(&self, env: &GenerationEnv<'_>) -> Result<String, FragmentError> {
        let text = query_function(
            &self.name,
            &self.executor,
            &self.args,
            &self.output,
            self.query.trim(),
            env.driver,
        )?;
        Ok(text)
    }
}

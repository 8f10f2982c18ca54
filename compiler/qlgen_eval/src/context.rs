//! Evaluation context.

use std::sync::Arc;

use crate::errors::EvalError;
use crate::format::parse;
use crate::resolve::resolve;
use crate::scope::{Scope, StructDef};

/// Everything bound so far while generating one package.
///
/// `package` holds the hand-written package sources and is shared by every
/// context built during a compile. `local` holds the generated buffer and is
/// rebuilt from scratch on every [`EvalContext::load`].
#[derive(Clone, Debug)]
pub struct EvalContext {
    package: Arc<Scope>,
    local: Scope,
}

impl EvalContext {
    /// A context with nothing generated yet.
    pub fn new(package: Arc<Scope>) -> Self {
        EvalContext {
            package,
            local: Scope::new(),
        }
    }

    /// Parse `source`, bind its declarations and resolve its references.
    pub fn load(package: Arc<Scope>, source: &str) -> Result<Self, EvalError> {
        let file = parse(source)?;

        let mut local = Scope::new();
        local.bind_file(&file)?;

        let ctx = EvalContext { package, local };
        resolve(&ctx, &file)?;
        Ok(ctx)
    }

    /// Whether `name` is bound by the generated buffer or the package.
    pub fn is_bound(&self, name: &str) -> bool {
        self.local.defines(name) || self.package.defines(name)
    }

    /// Struct definition visible under `name`; generated definitions win.
    pub fn lookup_struct(&self, name: &str) -> Option<&StructDef> {
        self.local
            .struct_def(name)
            .or_else(|| self.package.struct_def(name))
    }
}

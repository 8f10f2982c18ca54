//! Graph and node errors.

use std::io;
use std::path::PathBuf;

use qlgen_compile::CompileError;
use qlgen_context::ContextError;
use qlgen_package::PackageError;

use crate::schedule::Outputs;

/// Packages that still depend on each other after leveling, sorted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("import cycle between {}", members.join(", "))]
pub struct CycleError {
    pub members: Vec<String>,
}

/// Why one package produced no output.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("failed to create generator context `{config}`")]
    Context {
        config: String,
        #[source]
        source: ContextError,
    },
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Not compiled because a package it imports failed.
    #[error("dependency `{dependency}` failed")]
    UpstreamFailed { dependency: String },
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("failed to load package")]
    Discover(#[source] PackageError),
    #[error(transparent)]
    Cycle(#[from] CycleError),
    /// At least one package failed. `import_path` is the first in import
    /// path order; `outputs` holds what was written anyway.
    #[error("package `{import_path}` failed ({failures} failed in total)")]
    Compile {
        import_path: String,
        #[source]
        source: NodeError,
        failures: usize,
        outputs: Outputs,
    },
    #[error("generation cancelled")]
    Cancelled { outputs: Outputs },
}

impl GraphError {
    /// Outputs written before the run stopped.
    pub fn outputs(&self) -> Option<&Outputs> {
        match self {
            GraphError::Compile { outputs, .. } | GraphError::Cancelled { outputs } => Some(outputs),
            GraphError::Discover(_) | GraphError::Cycle(_) => None,
        }
    }
}

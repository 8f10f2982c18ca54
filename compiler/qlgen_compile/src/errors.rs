//! Package compile errors.

use std::path::PathBuf;

use qlgen_directive::{DirectiveError, Location};
use qlgen_eval::{EvalError, FormatError};

/// A package failed to compile. Nothing of it is written.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    /// The header built from the tagged files' imports does not load.
    #[error("invalid generated header: {0}")]
    Header(#[source] EvalError),
    /// A directive could not produce its fragment (including malformed
    /// directives).
    #[error("{location}: {source}")]
    Fragment {
        location: Location,
        #[source]
        source: DirectiveError,
    },
    /// The fragment does not parse. `fragment` is the unformatted text.
    #[error("{location}: generated code does not parse: {source}")]
    Format {
        location: Location,
        fragment: String,
        #[source]
        source: FormatError,
    },
    /// The fragment parses but refers to something not bound yet, or
    /// redefines something.
    #[error("{location}: generated code does not evaluate: {source}")]
    Evaluation {
        location: Location,
        fragment: String,
        #[source]
        source: EvalError,
    },
}

impl CompileError {
    /// Location of the directive that failed, if a directive failed.
    pub fn location(&self) -> Option<&Location> {
        match self {
            CompileError::Fragment { location, .. }
            | CompileError::Format { location, .. }
            | CompileError::Evaluation { location, .. } => Some(location),
            CompileError::Parse { .. } | CompileError::Header(_) => None,
        }
    }

    /// Text of the fragment that failed validation.
    pub fn fragment(&self) -> Option<&str> {
        match self {
            CompileError::Format { fragment, .. } | CompileError::Evaluation { fragment, .. } => {
                Some(fragment)
            }
            _ => None,
        }
    }
}

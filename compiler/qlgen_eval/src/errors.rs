//! Error types for formatting and evaluation.

/// The source could not be parsed, so it cannot be formatted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{column}: {message}")]
pub struct FormatError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl FormatError {
    #[cold]
    pub(crate) fn from_syn(err: &syn::Error) -> Self {
        let start = err.span().start();
        FormatError {
            message: err.to_string(),
            line: start.line,
            column: start.column,
        }
    }
}

/// Loading a buffer into an evaluation context failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Syntax(#[from] FormatError),
    #[error("line {line}: `{name}` is defined more than once")]
    Redefinition { name: String, line: usize },
    #[error("line {line}: cannot find `{name}` in this scope")]
    Unresolved { name: String, line: usize },
    #[error("line {line}: struct `{ty}` has no field `{field}`")]
    UnknownField {
        ty: String,
        field: String,
        line: usize,
    },
}

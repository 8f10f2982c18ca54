//! Source locations of directives.

use std::fmt;
use std::path::{Path, PathBuf};

/// `file:line:column`, 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Location {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location of the start of `span` in `file`.
    pub fn from_span(file: &Path, span: proc_macro2::Span) -> Self {
        let start = span.start();
        // proc-macro2 columns are 0-based.
        Location::new(file, start.line, start.column + 1)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

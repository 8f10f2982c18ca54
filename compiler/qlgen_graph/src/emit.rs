//! Writing generated files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::NodeError;

/// Write `text` to `output_file` inside `dir`, replacing any previous
/// contents.
pub fn write_output(dir: &Path, output_file: &Path, text: &str) -> Result<PathBuf, NodeError> {
    let path = dir.join(output_file);
    fs::write(&path, text).map_err(|source| NodeError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote generated file");
    Ok(path)
}

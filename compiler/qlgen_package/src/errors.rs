//! Package loading errors.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("`{import_path}` is not inside module `{module_path}`")]
    OutsideModule {
        import_path: String,
        module_path: String,
    },
    #[error("package `{import_path}` not found at {}", dir.display())]
    NotFound { import_path: String, dir: PathBuf },
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid cfg attribute in {}: {message}", path.display())]
    Cfg { path: PathBuf, message: String },
}

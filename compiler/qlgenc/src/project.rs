//! Project layout.

use std::io;
use std::path::{Path, PathBuf};

use qlgen_context::CONFIG_DIR;
use qlgen_package::BuildContext;
use serde::Deserialize;

/// Module path used when the manifest names no package.
const FALLBACK_MODULE: &str = "crate";

/// A project directory: `Cargo.toml`, `src/` and `.qlgen/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
    module_path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("no source directory at {}", dir.display())]
    NoSources { dir: PathBuf },
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Deserialize)]
struct Manifest {
    package: Option<ManifestPackage>,
}

#[derive(Deserialize)]
struct ManifestPackage {
    name: String,
}

impl Project {
    /// Open the project at `root`. The module path is `module` when given,
    /// else the package name from `Cargo.toml` with `-` replaced by `_`.
    pub fn load(root: &Path, module: Option<&str>) -> Result<Self, ProjectError> {
        let sources = root.join("src");
        if !sources.is_dir() {
            return Err(ProjectError::NoSources { dir: sources });
        }
        let module_path = match module {
            Some(module) => module.to_string(),
            None => manifest_module(root)?.unwrap_or_else(|| FALLBACK_MODULE.to_string()),
        };
        tracing::debug!(root = %root.display(), module = %module_path, "opened project");
        Ok(Project {
            root: root.to_path_buf(),
            module_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn source_root(&self) -> PathBuf {
        self.root.join("src")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join(CONFIG_DIR)
    }

    pub fn build_context(&self) -> BuildContext {
        BuildContext::new(self.source_root(), self.module_path.clone())
    }
}

fn manifest_module(root: &Path) -> Result<Option<String>, ProjectError> {
    let path = root.join("Cargo.toml");
    if !path.is_file() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path).map_err(|source| ProjectError::Read {
        path: path.clone(),
        source,
    })?;
    let manifest: Manifest =
        toml::from_str(&text).map_err(|source| ProjectError::Manifest { path, source })?;
    Ok(manifest.package.map(|package| package.name.replace('-', "_")))
}

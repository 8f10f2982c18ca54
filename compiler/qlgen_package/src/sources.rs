//! Package source text.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use crate::build::Package;
use crate::errors::PackageError;

/// One source file of a package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub path: PathBuf,
    pub text: String,
}

/// Files present only under the generation flag.
pub fn tagged_files(normal: &Package, generate: &Package) -> BTreeSet<String> {
    generate
        .files
        .iter()
        .filter(|name| !normal.files.contains(name))
        .cloned()
        .collect()
}

/// The text a package compile works from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageSources {
    /// Directive files, sorted by name.
    pub tagged: Vec<SourceFile>,
    /// The package's ordinary files, sorted by name.
    pub normal: Vec<SourceFile>,
}

impl PackageSources {
    /// Read the tagged files named in `tagged` and every file of `normal`.
    pub fn load(normal: &Package, tagged: &BTreeSet<String>) -> Result<Self, PackageError> {
        let read = |name: &String| -> Result<SourceFile, PackageError> {
            let path = normal.dir.join(name);
            let text = fs::read_to_string(&path).map_err(|source| PackageError::Read {
                path: path.clone(),
                source,
            })?;
            Ok(SourceFile {
                name: name.clone(),
                path,
                text,
            })
        };
        Ok(PackageSources {
            tagged: tagged.iter().map(read).collect::<Result<_, _>>()?,
            normal: normal.files.iter().map(read).collect::<Result<_, _>>()?,
        })
    }
}

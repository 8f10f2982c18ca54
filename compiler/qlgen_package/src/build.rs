//! Build context and package loading.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cfg::file_enabled;
use crate::errors::PackageError;

/// Flag under which directive files are compiled in.
pub const GENERATE_FLAG: &str = "qlgen";

/// First line of every generated file. Files starting with it are never
/// treated as package sources.
pub const GENERATED_MARKER: &str = "//! Code generated by qlgen";

/// Where packages live and which flags are set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildContext {
    root: PathBuf,
    module_path: String,
    flags: BTreeSet<String>,
}

/// A package as seen under one set of build flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Package {
    pub import_path: String,
    /// Last segment of the import path.
    pub name: String,
    pub dir: PathBuf,
    /// Included file names, sorted.
    pub files: Vec<String>,
    /// Other packages of the module this package imports, sorted.
    pub imports: BTreeSet<String>,
}

impl BuildContext {
    pub fn new(root: impl Into<PathBuf>, module_path: impl Into<String>) -> Self {
        BuildContext {
            root: root.into(),
            module_path: module_path.into(),
            flags: BTreeSet::new(),
        }
    }

    /// A copy of this context with `flag` also set.
    #[must_use]
    pub fn with_flag(&self, flag: &str) -> Self {
        let mut build = self.clone();
        build.flags.insert(flag.to_string());
        build
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    /// Whether `import_path` names a package of this module.
    pub fn in_module(&self, import_path: &str) -> bool {
        import_path == self.module_path
            || import_path
                .strip_prefix(self.module_path.as_str())
                .is_some_and(|rest| rest.starts_with("::"))
    }

    /// Directory of a package of this module.
    pub fn package_dir(&self, import_path: &str) -> Option<PathBuf> {
        if !self.in_module(import_path) {
            return None;
        }
        let mut dir = self.root.clone();
        let rest = import_path
            .strip_prefix(self.module_path.as_str())
            .unwrap_or_default();
        for segment in rest.split("::").filter(|s| !s.is_empty()) {
            dir.push(segment);
        }
        Some(dir)
    }

    /// Load a package: list its directory, keep the files whose cfg holds
    /// and collect their intra-module imports.
    pub fn import(&self, import_path: &str) -> Result<Package, PackageError> {
        let dir = self
            .package_dir(import_path)
            .ok_or_else(|| PackageError::OutsideModule {
                import_path: import_path.to_string(),
                module_path: self.module_path.clone(),
            })?;
        if !dir.is_dir() {
            return Err(PackageError::NotFound {
                import_path: import_path.to_string(),
                dir,
            });
        }

        let mut names = Vec::new();
        let entries = fs::read_dir(&dir).map_err(|source| PackageError::Read {
            path: dir.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || !path.extension().is_some_and(|e| e == "rs") {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        let mut files = Vec::with_capacity(names.len());
        let mut imports = BTreeSet::new();
        for name in names {
            let path = dir.join(&name);
            let text = fs::read_to_string(&path).map_err(|source| PackageError::Read {
                path: path.clone(),
                source,
            })?;
            if text.starts_with(GENERATED_MARKER) {
                continue;
            }
            let syntax = syn::parse_file(&text).map_err(|e| PackageError::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?;
            let enabled = file_enabled(&syntax, &self.flags)
                .map_err(|message| PackageError::Cfg { path, message })?;
            if !enabled {
                continue;
            }
            let module = self.file_module(import_path, &name);
            self.collect_imports(&module, &syntax, &mut imports);
            files.push(name);
        }
        imports.remove(import_path);

        tracing::trace!(import_path, files = files.len(), imports = imports.len(), "imported package");
        Ok(Package {
            import_path: import_path.to_string(),
            name: import_path
                .rsplit("::")
                .next()
                .unwrap_or(import_path)
                .to_string(),
            dir,
            files,
            imports,
        })
    }

    /// Module path of a package file as segments. `mod.rs`, and `lib.rs` or
    /// `main.rs` at the module root, are the package module itself; any other
    /// file is a child module of it.
    fn file_module(&self, import_path: &str, file_name: &str) -> Vec<String> {
        let mut module: Vec<String> = import_path.split("::").map(ToString::to_string).collect();
        let is_root = import_path == self.module_path;
        match file_name.strip_suffix(".rs") {
            Some("mod") | None => {}
            Some("lib" | "main") if is_root => {}
            Some(stem) => module.push(stem.to_string()),
        }
        module
    }

    fn collect_imports(&self, module: &[String], syntax: &syn::File, imports: &mut BTreeSet<String>) {
        for item in &syntax.items {
            let syn::Item::Use(item) = item else {
                continue;
            };
            let mut paths = Vec::new();
            use_paths(&item.tree, &mut Vec::new(), &mut paths);
            for path in paths {
                if let Some(package) = self.resolve_import(module, &path) {
                    imports.insert(package);
                }
            }
        }
    }

    /// The longest prefix of `path` that names a package directory, when the
    /// path points into this module. `module` is the importing file's module.
    fn resolve_import(&self, module: &[String], path: &[String]) -> Option<String> {
        let (first, mut rest) = path.split_first()?;
        let mut base: Vec<String> = match first.as_str() {
            "crate" => vec![self.module_path.clone()],
            "self" => module.to_vec(),
            "super" => module[..module.len().saturating_sub(1)].to_vec(),
            name if name == self.module_path => vec![self.module_path.clone()],
            _ => return None,
        };
        while let Some((segment, tail)) = rest.split_first() {
            if segment != "super" {
                break;
            }
            base.pop();
            rest = tail;
        }
        if base.is_empty() {
            return None;
        }

        base.extend(rest.iter().cloned());
        (1..=base.len())
            .rev()
            .map(|len| base[..len].join("::"))
            .find(|import_path| self.package_dir(import_path).is_some_and(|dir| dir.is_dir()))
    }
}

/// Flatten a use tree into full paths. Globs contribute their prefix.
fn use_paths(tree: &syn::UseTree, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    match tree {
        syn::UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            use_paths(&path.tree, prefix, out);
            prefix.pop();
        }
        syn::UseTree::Name(name) => {
            let mut full = prefix.clone();
            if name.ident != "self" {
                full.push(name.ident.to_string());
            }
            out.push(full);
        }
        syn::UseTree::Rename(rename) => {
            let mut full = prefix.clone();
            full.push(rename.ident.to_string());
            out.push(full);
        }
        syn::UseTree::Glob(_) => out.push(prefix.clone()),
        syn::UseTree::Group(group) => {
            for tree in &group.items {
                use_paths(tree, prefix, out);
            }
        }
    }
}

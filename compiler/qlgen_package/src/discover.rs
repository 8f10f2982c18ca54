//! Package discovery.

use std::fs;
use std::path::Path;

use crate::build::BuildContext;

/// Import paths of every directory under the module root that holds `.rs`
/// files, sorted. Hidden directories and `target` are skipped.
pub fn discover_packages(build: &BuildContext) -> Vec<String> {
    let mut packages = Vec::new();
    discover_recursive(build.root(), build.module_path(), &mut packages);
    packages.sort();
    packages
}

fn discover_recursive(dir: &Path, import_path: &str, packages: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    let mut has_sources = false;
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        if path.is_dir() {
            if matches!(name, "target" | "node_modules") {
                continue;
            }
            discover_recursive(&path, &format!("{import_path}::{name}"), packages);
        } else if path.extension().is_some_and(|e| e == "rs") {
            has_sources = true;
        }
    }
    if has_sources {
        packages.push(import_path.to_string());
    }
}

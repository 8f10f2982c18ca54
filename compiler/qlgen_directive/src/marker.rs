//! Marker type resolution.
//!
//! Directives are recognised by the type of their first parameter. The type
//! may be written fully qualified (`qlgen::Structure`) or through a `use`
//! item of the same file (`use qlgen::{Structure, Scanner as Rows}`).

use rustc_hash::FxHashMap;
use syn::ext::IdentExt;

use crate::kind::DirectiveKind;

/// Crate that exports the marker types.
pub const MARKER_CRATE: &str = "qlgen";

/// How a file refers to the marker crate and its types.
#[derive(Clone, Debug, Default)]
pub struct MarkerScope {
    /// Local names bound to a marker type.
    aliases: FxHashMap<String, DirectiveKind>,
    /// Local names for the marker crate itself (`qlgen`, `use qlgen as q`).
    crates: Vec<String>,
    /// `use qlgen::*` makes every marker visible unqualified.
    glob: bool,
}

impl MarkerScope {
    pub fn from_file(file: &syn::File) -> Self {
        let mut scope = MarkerScope {
            crates: vec![MARKER_CRATE.to_string()],
            ..Self::default()
        };
        for item in &file.items {
            if let syn::Item::Use(item) = item {
                scope.bind(&item.tree, false);
            }
        }
        scope
    }

    /// `in_marker` is true once the walk is below the marker crate.
    fn bind(&mut self, tree: &syn::UseTree, in_marker: bool) {
        match tree {
            syn::UseTree::Path(path) if !in_marker => {
                let ident = path.ident.unraw().to_string();
                if ident == MARKER_CRATE {
                    self.bind(&path.tree, true);
                }
            }
            // `qlgen::markers::Structure` is not a marker path.
            syn::UseTree::Path(_) => {}
            syn::UseTree::Name(name) if in_marker => {
                let ident = name.ident.unraw().to_string();
                if let Some(kind) = DirectiveKind::from_marker(&ident) {
                    self.aliases.insert(ident, kind);
                }
            }
            syn::UseTree::Name(_) => {}
            syn::UseTree::Rename(rename) => {
                let ident = rename.ident.unraw().to_string();
                let alias = rename.rename.unraw().to_string();
                if in_marker {
                    if let Some(kind) = DirectiveKind::from_marker(&ident) {
                        self.aliases.insert(alias, kind);
                    }
                } else if ident == MARKER_CRATE {
                    self.crates.push(alias);
                }
            }
            syn::UseTree::Glob(_) => {
                if in_marker {
                    self.glob = true;
                }
            }
            syn::UseTree::Group(group) => {
                for tree in &group.items {
                    self.bind(tree, in_marker);
                }
            }
        }
    }

    /// The directive kind a parameter type names, if any.
    pub fn resolve(&self, ty: &syn::Type) -> Option<DirectiveKind> {
        let syn::Type::Path(path) = ty else {
            return None;
        };
        if path.qself.is_some() {
            return None;
        }
        let segments: Vec<String> = path
            .path
            .segments
            .iter()
            .map(|segment| segment.ident.unraw().to_string())
            .collect();
        match segments.as_slice() {
            [name] => self.aliases.get(name).copied().or_else(|| {
                if self.glob {
                    DirectiveKind::from_marker(name)
                } else {
                    None
                }
            }),
            [krate, name] if self.crates.contains(krate) => DirectiveKind::from_marker(name),
            _ => None,
        }
    }
}

/// Whether a `use` item only imports from the marker crate.
pub fn is_marker_use(item: &syn::ItemUse) -> bool {
    match &item.tree {
        syn::UseTree::Path(path) => path.ident.unraw() == MARKER_CRATE,
        syn::UseTree::Name(name) => name.ident.unraw() == MARKER_CRATE,
        syn::UseTree::Rename(rename) => rename.ident.unraw() == MARKER_CRATE,
        syn::UseTree::Glob(_) | syn::UseTree::Group(_) => false,
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    fn scope(src: &str) -> MarkerScope {
        MarkerScope::from_file(&syn::parse_file(src).unwrap())
    }

    fn ty(src: &str) -> syn::Type {
        syn::parse_str(src).unwrap()
    }

    #[test]
    fn test_qualified_marker() {
        let scope = scope("");
        assert_eq!(scope.resolve(&ty("qlgen::Scanner")), Some(DirectiveKind::Scanner));
        assert_eq!(scope.resolve(&ty("Scanner")), None);
        assert_eq!(scope.resolve(&ty("other::Scanner")), None);
    }

    #[test]
    fn test_imported_and_renamed_markers() {
        let scope = scope("use qlgen::{Structure, InsertBatch as Batch};");
        assert_eq!(scope.resolve(&ty("Structure")), Some(DirectiveKind::Structure));
        assert_eq!(scope.resolve(&ty("Batch")), Some(DirectiveKind::InsertBatch));
        assert_eq!(scope.resolve(&ty("InsertBatch")), None);
    }

    #[test]
    fn test_glob_and_crate_alias() {
        let scope = scope("use qlgen::*; use qlgen as q;");
        assert_eq!(scope.resolve(&ty("Function")), Some(DirectiveKind::Function));
        assert_eq!(
            scope.resolve(&ty("q::QueryAutogen")),
            Some(DirectiveKind::QueryAutogen)
        );
        assert_eq!(scope.resolve(&ty("Rows")), None);
    }

    #[test]
    fn test_reference_is_not_a_marker() {
        let scope = scope("use qlgen::Structure;");
        assert_eq!(scope.resolve(&ty("&Structure")), None);
    }

    #[test]
    fn test_is_marker_use() {
        let file = syn::parse_file("use qlgen::Structure; use std::fmt; use qlgen;").unwrap();
        let flags: Vec<bool> = file
            .items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Use(u) => Some(is_marker_use(u)),
                _ => None,
            })
            .collect();
        assert_eq!(flags, vec![true, false, true]);
    }
}

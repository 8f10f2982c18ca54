//! Declaration binding.
//!
//! A [`Scope`] records the names a file brings into scope: its top-level
//! items, split into the type and value namespaces, and the leaf names of its
//! `use` items. Struct definitions are kept in full so directives can read
//! field lists and the resolver can check struct literals.

use quote::ToTokens;
use rustc_hash::{FxHashMap, FxHashSet};
use syn::ext::IdentExt;

use crate::errors::EvalError;

/// A named field of a struct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    /// Full field type, compacted (`Option<String>`).
    pub ty: String,
    /// Inner type when the field is `Option<T>`.
    pub optional: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: &syn::Type) -> Self {
        FieldDef {
            name: name.into(),
            ty: type_string(ty),
            optional: option_inner(ty).map(type_string),
        }
    }

    /// The non-optional type of the field.
    pub fn base_type(&self) -> &str {
        self.optional.as_deref().unwrap_or(&self.ty)
    }

    pub fn is_optional(&self) -> bool {
        self.optional.is_some()
    }
}

/// A struct definition. Tuple and unit structs have no named fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl StructDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Names bound by one or more files.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    types: FxHashSet<String>,
    values: FxHashSet<String>,
    imports: FxHashSet<String>,
    structs: FxHashMap<String, StructDef>,
}

#[derive(Copy, Clone)]
enum Namespace {
    Type,
    Value,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every file, tolerating duplicates.
    ///
    /// Used for hand-written package sources, which the Rust compiler checks
    /// on its own.
    pub fn from_files<'a>(files: impl IntoIterator<Item = &'a syn::File>) -> Self {
        let mut scope = Scope::new();
        for file in files {
            scope.bind_items(&file.items, |_| {});
        }
        scope
    }

    /// Bind the top-level items of `file`. A second definition of a name in
    /// the same namespace is an error naming the first one found.
    pub fn bind_file(&mut self, file: &syn::File) -> Result<(), EvalError> {
        let mut first = None;
        self.bind_items(&file.items, |ident| {
            first.get_or_insert_with(|| redefinition(ident));
        });
        first.map_or(Ok(()), Err)
    }

    /// Bind `items`, calling `redefined` for every name already bound in its
    /// namespace.
    fn bind_items(&mut self, items: &[syn::Item], mut redefined: impl FnMut(&syn::Ident)) {
        for item in items {
            for (namespace, ident) in self.declare(item) {
                let names = match namespace {
                    Namespace::Type => &mut self.types,
                    Namespace::Value => &mut self.values,
                };
                if !names.insert(ident.unraw().to_string()) {
                    redefined(ident);
                }
            }
        }
    }

    /// Record what `item` brings into scope besides plain names, and return
    /// the names it defines.
    fn declare<'i>(&mut self, item: &'i syn::Item) -> Vec<(Namespace, &'i syn::Ident)> {
        match item {
            syn::Item::Struct(s) => {
                let name = s.ident.unraw().to_string();
                let (fields, namespaces) = match &s.fields {
                    syn::Fields::Named(named) => (
                        named
                            .named
                            .iter()
                            .filter_map(|f| {
                                f.ident
                                    .as_ref()
                                    .map(|ident| FieldDef::new(ident.unraw().to_string(), &f.ty))
                            })
                            .collect(),
                        vec![(Namespace::Type, &s.ident)],
                    ),
                    // Tuple and unit structs are also values.
                    syn::Fields::Unnamed(_) | syn::Fields::Unit => (
                        Vec::new(),
                        vec![(Namespace::Type, &s.ident), (Namespace::Value, &s.ident)],
                    ),
                };
                self.structs.insert(name.clone(), StructDef { name, fields });
                namespaces
            }
            syn::Item::Enum(e) => vec![(Namespace::Type, &e.ident)],
            syn::Item::Union(u) => vec![(Namespace::Type, &u.ident)],
            syn::Item::Trait(t) => vec![(Namespace::Type, &t.ident)],
            syn::Item::TraitAlias(t) => vec![(Namespace::Type, &t.ident)],
            syn::Item::Type(t) => vec![(Namespace::Type, &t.ident)],
            syn::Item::Fn(f) => vec![(Namespace::Value, &f.sig.ident)],
            syn::Item::Const(c) => vec![(Namespace::Value, &c.ident)],
            syn::Item::Static(s) => vec![(Namespace::Value, &s.ident)],
            syn::Item::Mod(m) => {
                self.imports.insert(m.ident.unraw().to_string());
                Vec::new()
            }
            syn::Item::ExternCrate(c) => {
                let ident = c.rename.as_ref().map_or(&c.ident, |(_, rename)| rename);
                self.imports.insert(ident.unraw().to_string());
                Vec::new()
            }
            syn::Item::Use(u) => {
                self.bind_use(&u.tree);
                Vec::new()
            }
            syn::Item::Macro(m) => {
                if let Some(ident) = &m.ident {
                    self.imports.insert(ident.unraw().to_string());
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn bind_use(&mut self, tree: &syn::UseTree) {
        match tree {
            syn::UseTree::Path(path) => {
                // `use a::b::{self, C}` also binds `b`.
                if let syn::UseTree::Group(group) = path.tree.as_ref() {
                    let imports_self = group
                        .items
                        .iter()
                        .any(|tree| matches!(tree, syn::UseTree::Name(n) if n.ident == "self"));
                    if imports_self {
                        self.imports.insert(path.ident.unraw().to_string());
                    }
                }
                self.bind_use(&path.tree);
            }
            syn::UseTree::Name(name) => {
                self.imports.insert(name.ident.unraw().to_string());
            }
            syn::UseTree::Rename(rename) => {
                self.imports.insert(rename.rename.unraw().to_string());
            }
            syn::UseTree::Group(group) => {
                for tree in &group.items {
                    if let syn::UseTree::Name(name) = tree {
                        if name.ident == "self" {
                            continue;
                        }
                    }
                    self.bind_use(tree);
                }
            }
            // Glob imports bring in names this scope cannot see.
            syn::UseTree::Glob(_) => {}
        }
    }

    /// Whether `name` is bound in either namespace or imported.
    pub fn defines(&self, name: &str) -> bool {
        self.types.contains(name) || self.values.contains(name) || self.imports.contains(name)
    }

    pub fn struct_def(&self, name: &str) -> Option<&StructDef> {
        self.structs.get(name)
    }

}

/// `T` for a type written as `Option<T>`.
fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(path) = ty else {
        return None;
    };
    let last = path.path.segments.last()?;
    if last.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    match args.args.first() {
        Some(syn::GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// Render a type without the spacing `TokenStream` inserts between tokens.
pub fn type_string(ty: &syn::Type) -> String {
    ty.to_token_stream()
        .to_string()
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" <", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace("& ", "&")
}

#[cold]
fn redefinition(ident: &syn::Ident) -> EvalError {
    EvalError::Redefinition {
        name: ident.unraw().to_string(),
        line: ident.span().start().line,
    }
}

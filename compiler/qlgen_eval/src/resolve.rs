//! Reference resolution.
//!
//! Walks a syntax tree and checks that every name a generated fragment can
//! depend on is bound:
//!
//! - single-segment type paths (`Profile`, `Vec<ProfileScanner>`)
//! - the leading segment of type-like expression paths (`ProfileScanner::query`)
//! - struct literal paths and their field names
//!
//! Lowercase single-segment expression paths are locals or functions and are
//! left alone; multi-segment paths rooted at a crate are external.

use rustc_hash::FxHashSet;
use syn::ext::IdentExt;
use syn::visit::{self, Visit};

use crate::context::EvalContext;
use crate::errors::EvalError;

/// Names in scope in every Rust module.
pub const PRELUDE: &[&str] = &[
    // primitives
    "bool", "char", "str", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64",
    "i128", "isize", "f32", "f64", "Self",
    // std prelude
    "String", "Vec", "Option", "Some", "None", "Result", "Ok", "Err", "Box", "ToString",
    "ToOwned", "Clone", "Copy", "Send", "Sync", "Sized", "Unpin", "Default", "Drop", "Fn", "FnMut",
    "FnOnce", "Iterator", "IntoIterator", "DoubleEndedIterator", "ExactSizeIterator", "Extend",
    "FromIterator", "From", "Into", "TryFrom", "TryInto", "AsRef", "AsMut", "PartialEq", "Eq",
    "PartialOrd", "Ord",
];

pub(crate) fn resolve(ctx: &EvalContext, file: &syn::File) -> Result<(), EvalError> {
    let mut generics = GenericParams::default();
    generics.visit_file(file);

    let mut resolver = Resolver {
        ctx,
        generics: generics.names,
        error: None,
    };
    resolver.visit_file(file);

    match resolver.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Collects every type parameter declared anywhere in the file.
#[derive(Default)]
struct GenericParams {
    names: FxHashSet<String>,
}

impl<'ast> Visit<'ast> for GenericParams {
    fn visit_type_param(&mut self, node: &'ast syn::TypeParam) {
        self.names.insert(node.ident.unraw().to_string());
        visit::visit_type_param(self, node);
    }
}

struct Resolver<'a> {
    ctx: &'a EvalContext,
    generics: FxHashSet<String>,
    /// First failure in source order.
    error: Option<EvalError>,
}

impl Resolver<'_> {
    fn check(&mut self, ident: &syn::Ident) {
        if self.error.is_some() {
            return;
        }
        let name = ident.unraw().to_string();
        if PRELUDE.contains(&name.as_str()) || self.generics.contains(&name) {
            return;
        }
        if !self.ctx.is_bound(&name) {
            self.error = Some(EvalError::Unresolved {
                name,
                line: ident.span().start().line,
            });
        }
    }

    fn check_fields(&mut self, ty: &syn::Ident, fields: &syn::punctuated::Punctuated<syn::FieldValue, syn::Token![,]>) {
        if self.error.is_some() {
            return;
        }
        let ty_name = ty.unraw().to_string();
        let Some(def) = self.ctx.lookup_struct(&ty_name) else {
            return;
        };
        for field in fields {
            let syn::Member::Named(member) = &field.member else {
                continue;
            };
            let name = member.unraw().to_string();
            if def.field(&name).is_none() {
                self.error = Some(EvalError::UnknownField {
                    ty: ty_name,
                    field: name,
                    line: member.span().start().line,
                });
                return;
            }
        }
    }
}

/// Single-segment, non-qualified path.
fn simple_ident<'a>(qself: Option<&syn::QSelf>, path: &'a syn::Path) -> Option<&'a syn::Ident> {
    if qself.is_some() || path.leading_colon.is_some() || path.segments.len() != 1 {
        return None;
    }
    path.segments.first().map(|segment| &segment.ident)
}

fn is_type_like(ident: &syn::Ident) -> bool {
    ident
        .unraw()
        .to_string()
        .chars()
        .next()
        .is_some_and(char::is_uppercase)
}

impl<'ast> Visit<'ast> for Resolver<'_> {
    fn visit_type_path(&mut self, node: &'ast syn::TypePath) {
        if let Some(ident) = simple_ident(node.qself.as_ref(), &node.path) {
            self.check(ident);
        }
        visit::visit_type_path(self, node);
    }

    fn visit_expr_path(&mut self, node: &'ast syn::ExprPath) {
        if node.qself.is_none() && node.path.leading_colon.is_none() && node.path.segments.len() > 1
        {
            if let Some(first) = node.path.segments.first() {
                if is_type_like(&first.ident) {
                    self.check(&first.ident);
                }
            }
        }
        visit::visit_expr_path(self, node);
    }

    fn visit_expr_struct(&mut self, node: &'ast syn::ExprStruct) {
        if let Some(ident) = simple_ident(node.qself.as_ref(), &node.path) {
            self.check(ident);
            self.check_fields(ident, &node.fields);
        }
        visit::visit_expr_struct(self, node);
    }
}

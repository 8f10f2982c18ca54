//! Directive registry and matching.

use std::path::Path;

use qlgen_context::{Dialect, DialectError, Driver};
use qlgen_eval::EvalContext;
use syn::ext::IdentExt;

use crate::directives::{
    AutogenDirective, FunctionDirective, InsertBatchDirective, InsertDirective, ScannerDirective,
    StructureDirective,
};
use crate::kind::DirectiveKind;
use crate::location::Location;
use crate::marker::MarkerScope;
use crate::options::Options;
use crate::pattern::Pattern;
use crate::result::CompileResult;

static STRUCTURE: StructureDirective = StructureDirective;
static SCANNER: ScannerDirective = ScannerDirective;
static FUNCTION: FunctionDirective = FunctionDirective;
static INSERT: InsertDirective = InsertDirective;
static INSERT_BATCH: InsertBatchDirective = InsertBatchDirective;
static AUTOGEN: AutogenDirective = AutogenDirective;

/// What a fragment generator can see.
pub struct GenerationEnv<'a> {
    /// Fragments generated so far, plus the package's own declarations.
    pub eval: &'a EvalContext,
    pub dialect: &'a dyn Dialect,
    pub driver: &'a dyn Driver,
}

/// Failure rendering a fragment. The directive kind and name are attached
/// by [`CompileResult`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FragmentError {
    Message(String),
    Dialect(DialectError),
}

impl From<String> for FragmentError {
    fn from(message: String) -> Self {
        FragmentError::Message(message)
    }
}

impl From<DialectError> for FragmentError {
    fn from(err: DialectError) -> Self {
        FragmentError::Dialect(err)
    }
}

/// A validated directive, ready to render.
pub trait Fragment {
    fn generate(&self, env: &GenerationEnv<'_>) -> Result<String, FragmentError>;
}

/// A directive function whose marker has been recognised.
#[derive(Debug)]
pub struct Declaration<'a> {
    pub location: Location,
    pub kind: DirectiveKind,
    pub name: String,
    /// Name of the marker parameter; `None` for `_`.
    pub receiver: Option<String>,
    /// Parameters after the marker.
    pub params: Vec<&'a syn::PatType>,
    pub body: &'a syn::Block,
}

impl Declaration<'_> {
    pub fn options(&self) -> Result<Options, String> {
        Options::parse(self.body, self.receiver.as_deref())
    }

    /// The directive takes only the marker.
    pub fn expect_no_params(&self) -> Result<(), String> {
        match self.params.len() {
            0 => Ok(()),
            n => Err(format!("expected no parameters after the marker, found {n}")),
        }
    }

    /// The directive takes the marker and exactly one pattern.
    pub fn pattern(&self) -> Result<Pattern, String> {
        match self.params.as_slice() {
            [param] => Pattern::parse(&param.ty),
            [] => Err("missing pattern parameter after the marker".to_string()),
            params => Err(format!(
                "expected one pattern parameter after the marker, found {}",
                params.len()
            )),
        }
    }
}

/// How one directive kind validates its declaration.
pub trait DirectiveDefinition: Sync {
    fn kind(&self) -> DirectiveKind;

    /// Check the declaration's shape and capture what its fragment needs.
    /// `Err` is the malformed reason.
    fn validate(&self, decl: &Declaration<'_>) -> Result<Box<dyn Fragment>, String>;
}

/// Registry mapping [`DirectiveKind`] to directive definitions.
///
/// Definitions are zero-sized statics, dispatched by matching on the kind.
pub struct DirectiveRegistry {
    _private: (),
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        DirectiveRegistry { _private: () }
    }

    pub fn get(&self, kind: DirectiveKind) -> &'static dyn DirectiveDefinition {
        match kind {
            DirectiveKind::Structure => &STRUCTURE,
            DirectiveKind::Scanner => &SCANNER,
            DirectiveKind::Function => &FUNCTION,
            DirectiveKind::Insert => &INSERT,
            DirectiveKind::InsertBatch => &INSERT_BATCH,
            DirectiveKind::QueryAutogen => &AUTOGEN,
        }
    }

    /// Kinds in matching order.
    pub fn kinds(&self) -> impl Iterator<Item = DirectiveKind> {
        DirectiveKind::ALL.into_iter()
    }

    pub fn len(&self) -> usize {
        DirectiveKind::ALL.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Directives declared at the top level of `syntax`, in source order.
    pub fn match_file(&self, path: &Path, syntax: &syn::File) -> Vec<CompileResult> {
        let markers = MarkerScope::from_file(syntax);
        syntax
            .items
            .iter()
            .filter_map(|item| self.match_item(&markers, path, item))
            .collect()
    }

    /// Match one item. `None` means the item is not a directive.
    pub fn match_item(
        &self,
        markers: &MarkerScope,
        path: &Path,
        item: &syn::Item,
    ) -> Option<CompileResult> {
        let syn::Item::Fn(func) = item else {
            return None;
        };
        let Some(syn::FnArg::Typed(first)) = func.sig.inputs.first() else {
            return None;
        };
        let resolved = markers.resolve(&first.ty)?;
        let kind = self.kinds().find(|kind| *kind == resolved)?;

        let location = Location::from_span(path, func.sig.ident.span());
        let name = func.sig.ident.unraw().to_string();
        tracing::debug!(%location, %kind, name = %name, "matched directive");

        let decl = match declaration(kind, location.clone(), name.clone(), func, first) {
            Ok(decl) => decl,
            Err(reason) => return Some(CompileResult::malformed(location, kind, name, reason)),
        };
        match self.get(kind).validate(&decl) {
            Ok(fragment) => Some(CompileResult::new(location, kind, name, fragment)),
            Err(reason) => {
                tracing::debug!(%location, %kind, %reason, "malformed directive");
                Some(CompileResult::malformed(location, kind, name, reason))
            }
        }
    }
}

impl Default for DirectiveRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape checks shared by every kind.
fn declaration<'a>(
    kind: DirectiveKind,
    location: Location,
    name: String,
    func: &'a syn::ItemFn,
    marker: &'a syn::PatType,
) -> Result<Declaration<'a>, String> {
    let sig = &func.sig;
    if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
        return Err("directive may not be generic".to_string());
    }
    if sig.asyncness.is_some() || sig.unsafety.is_some() || sig.constness.is_some() {
        return Err("directive must be a plain `fn`".to_string());
    }
    if sig.variadic.is_some() {
        return Err("directive may not be variadic".to_string());
    }
    if !matches!(sig.output, syn::ReturnType::Default) {
        return Err("directive may not return a value".to_string());
    }

    let receiver = match marker.pat.as_ref() {
        syn::Pat::Ident(ident) if ident.by_ref.is_none() && ident.subpat.is_none() => {
            Some(ident.ident.unraw().to_string())
        }
        syn::Pat::Wild(_) => None,
        _ => return Err("marker parameter must be a plain name".to_string()),
    };

    let mut params = Vec::with_capacity(sig.inputs.len().saturating_sub(1));
    for input in sig.inputs.iter().skip(1) {
        match input {
            syn::FnArg::Typed(param) => params.push(param),
            syn::FnArg::Receiver(_) => return Err("directive may not take `self`".to_string()),
        }
    }

    Ok(Declaration {
        location,
        kind,
        name,
        receiver,
        params,
        body: &func.block,
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

//! qlgen Directives
//!
//! A directive is an ordinary top-level function whose first parameter is a
//! marker type from the `qlgen` crate:
//!
//! ```text
//! use qlgen::{Function, Scanner, Structure};
//!
//! pub fn profile(gql: Structure) {
//!     gql.table("profiles");
//! }
//!
//! pub fn profile_scanner(gql: Scanner, pattern: fn(p: Profile)) {}
//!
//! pub fn find_profile(gql: Function, pattern: fn(q: &Client, id: i64) -> ProfileScanner) {
//!     gql.query("SELECT id, email FROM profiles WHERE id = $1");
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! syn::ItemFn ──► MarkerScope::resolve(first param)
//!                     │ (DirectiveKind::ALL order, first match wins)
//!                     ▼
//!        DirectiveRegistry::get(kind).validate(decl)
//!                     │
//!          ┌──────────┴───────────┐
//!          ▼                      ▼
//!   Box<dyn Fragment>      malformed reason
//!          │                      │
//!          ▼                      ▼
//!   CompileResult (kind priority) CompileResult (MALFORMED priority,
//!                                 generator always fails)
//! ```
//!
//! The set of directive kinds is closed. Adding one means adding a
//! [`DirectiveKind`] variant, a definition, and a registry entry.

mod directives;
mod errors;
mod kind;
mod location;
mod marker;
mod options;
mod pattern;
mod registry;
mod result;

pub use errors::DirectiveError;
pub use kind::{DirectiveKind, Priority};
pub use location::Location;
pub use marker::{is_marker_use, MarkerScope, MARKER_CRATE};
pub use options::{OptionCall, OptionValue, Options};
pub use pattern::{Pattern, PatternParam};
pub use registry::{
    Declaration, DirectiveDefinition, DirectiveRegistry, Fragment, FragmentError, GenerationEnv,
};
pub use result::{CompileResult, FragmentGenerator};

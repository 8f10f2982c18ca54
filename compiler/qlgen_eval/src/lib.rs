//! qlgen Evaluation
//!
//! Staged semantic validation for generated source.
//!
//! Generated fragments are appended to a scratch buffer one at a time. After
//! each append the whole buffer is reformatted and loaded into a fresh
//! [`EvalContext`]: every declaration is re-bound and every identifier
//! reference is resolved against what has been bound so far. A fragment that
//! refers to something a later fragment defines fails here, before anything
//! reaches disk.
//!
//! # Architecture
//!
//! ```text
//! scratch buffer ──► format() ──► syn::File
//!                                    │
//!                         Scope::bind_file (strict)
//!                                    │
//!                 package Scope ──► EvalContext ──► resolve references
//! ```
//!
//! The checker is a symbol table, not a type checker: it proves names
//! resolve, not that the program is well typed.

mod context;
mod errors;
mod format;
mod resolve;
mod scope;

pub use context::EvalContext;
pub use errors::{EvalError, FormatError};
pub use format::{format, parse};
pub use resolve::PRELUDE;
pub use scope::{type_string, FieldDef, Scope, StructDef};

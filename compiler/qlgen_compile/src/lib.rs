//! qlgen Package Compiler
//!
//! Turns the directive files of one package into a single generated source
//! file. Fragments are generated in priority order and each one is checked
//! against everything generated before it, so a package either produces a
//! complete file or an error naming the directive that broke it.
//!
//! # Flow
//!
//! ```text
//! tagged files ──► match directives ──► stable sort by priority
//!                                             │
//!   header (marker, `use super::*;`, tagged `use` items)
//!                                             ▼
//!        ┌──────────── for each directive ─────────────┐
//!        │ generate ► append ► format ► EvalContext::load │
//!        └──────────────────────────────────────────────┘
//!                                             │
//!                                             ▼
//!                                       generated file
//! ```

mod compile;
mod errors;
mod header;

pub use compile::{autocompile_package, EvaluationConfig};
pub use errors::CompileError;
pub use header::package_header;

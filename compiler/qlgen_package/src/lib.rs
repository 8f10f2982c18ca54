//! qlgen Packages
//!
//! A package is a directory of `.rs` files under the module root. Import
//! path `app::models` names `<root>/models/`; the module path itself names
//! the root.
//!
//! Which files belong to a package depends on the build flags: a file whose
//! inner `#![cfg(...)]` attributes do not hold is left out. Directive files
//! are gated on the generation flag, so loading a package twice (with and
//! without [`GENERATE_FLAG`]) tells the generator which files carry
//! directives.

mod build;
mod cfg;
mod discover;
mod errors;
mod sources;

pub use build::{BuildContext, Package, GENERATED_MARKER, GENERATE_FLAG};
pub use cfg::{cfg_holds, file_enabled};
pub use discover::discover_packages;
pub use errors::PackageError;
pub use sources::{tagged_files, PackageSources, SourceFile};

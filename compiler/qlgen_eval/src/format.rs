//! Source normalization.

use crate::errors::FormatError;

/// Parse Rust source into a syntax tree.
pub fn parse(source: &str) -> Result<syn::File, FormatError> {
    syn::parse_file(source).map_err(|err| FormatError::from_syn(&err))
}

/// Reformat Rust source.
///
/// Formatting is a pure function of the syntax tree, so formatting the same
/// source twice yields identical text. Plain `//` comments do not survive;
/// doc comments (`///`, `//!`) do.
pub fn format(source: &str) -> Result<String, FormatError> {
    let file = parse(source)?;
    Ok(prettyplease::unparse(&file))
}

//! Generated file header.

use std::fmt::Write;

use qlgen_directive::is_marker_use;
use qlgen_package::GENERATED_MARKER;
use quote::ToTokens;

/// Marker line, `use super::*;` and the non-marker `use` items of the
/// tagged files, deduplicated, in file then source order.
pub fn package_header<'a>(
    import_path: &str,
    config_name: &str,
    files: impl IntoIterator<Item = &'a syn::File>,
) -> String {
    let mut header = String::new();
    let _ = writeln!(
        header,
        "{GENERATED_MARKER} for `{import_path}` from {config_name}. DO NOT EDIT."
    );
    header.push('\n');
    header.push_str("use super::*;\n");

    let mut seen: Vec<syn::ItemUse> = vec![syn::parse_quote!(use super::*;)];
    for file in files {
        for item in &file.items {
            let syn::Item::Use(item) = item else {
                continue;
            };
            if is_marker_use(item) || seen.contains(item) {
                continue;
            }
            header.push_str(&item.to_token_stream().to_string());
            header.push('\n');
            seen.push(item.clone());
        }
    }
    header
}

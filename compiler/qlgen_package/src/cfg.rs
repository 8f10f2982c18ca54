//! File-level `#![cfg(...)]` evaluation.
//!
//! Supported predicates: `name`, `key = "value"`, `not(p)`, `all(p, ..)` and
//! `any(p, ..)`. A name holds when it is one of the flags; `key = "value"`
//! holds when the flag `key="value"` is set.

use std::collections::BTreeSet;

use syn::punctuated::Punctuated;

/// Whether every inner `cfg` attribute of `file` holds under `flags`.
pub fn file_enabled(file: &syn::File, flags: &BTreeSet<String>) -> Result<bool, String> {
    for attr in &file.attrs {
        if !matches!(attr.style, syn::AttrStyle::Inner(_)) || !attr.path().is_ident("cfg") {
            continue;
        }
        let predicate: syn::Meta = attr.parse_args().map_err(|e| e.to_string())?;
        if !cfg_holds(&predicate, flags)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluate one cfg predicate.
pub fn cfg_holds(meta: &syn::Meta, flags: &BTreeSet<String>) -> Result<bool, String> {
    match meta {
        syn::Meta::Path(path) => {
            let name = path
                .get_ident()
                .ok_or_else(|| "cfg names must be single identifiers".to_string())?;
            Ok(flags.contains(&name.to_string()))
        }
        syn::Meta::NameValue(pair) => {
            let key = pair
                .path
                .get_ident()
                .ok_or_else(|| "cfg keys must be single identifiers".to_string())?;
            let syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(value),
                ..
            }) = &pair.value
            else {
                return Err(format!("cfg `{key}` expects a string value"));
            };
            Ok(flags.contains(&format!("{key}=\"{}\"", value.value())))
        }
        syn::Meta::List(list) => {
            let op = list
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();
            let args = list
                .parse_args_with(Punctuated::<syn::Meta, syn::Token![,]>::parse_terminated)
                .map_err(|e| e.to_string())?;
            match op.as_str() {
                "all" => {
                    for arg in &args {
                        if !cfg_holds(arg, flags)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                "any" => {
                    for arg in &args {
                        if cfg_holds(arg, flags)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
                "not" => match args.first() {
                    Some(arg) if args.len() == 1 => Ok(!cfg_holds(arg, flags)?),
                    _ => Err("`not` takes exactly one predicate".to_string()),
                },
                other => Err(format!("unknown cfg operator `{other}`")),
            }
        }
    }
}

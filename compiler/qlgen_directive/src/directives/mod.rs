//! Directive definitions and their fragment templates.

mod autogen;
mod function;
mod insert;
mod scanner;
mod structure;

pub use autogen::AutogenDirective;
pub use function::FunctionDirective;
pub use insert::{InsertBatchDirective, InsertDirective};
pub use scanner::ScannerDirective;
pub use structure::StructureDirective;

use heck::{ToSnakeCase, ToUpperCamelCase};
use qlgen_context::{Driver, NullableType};

use crate::pattern::PatternParam;

/// Rust keywords that must be written as raw identifiers.
const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while", "async",
    "await", "dyn", "abstract", "become", "box", "do", "final", "macro", "override", "priv",
    "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/// Type name for a directive or table name (`profile_scanner` -> `ProfileScanner`).
pub(crate) fn type_name(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Function identifier for a directive name (`findProfile` -> `find_profile`).
pub(crate) fn fn_ident(name: &str) -> String {
    ident(&name.to_snake_case())
}

/// `name` as an identifier, raw when it is a keyword.
pub(crate) fn ident(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Whether a column name can be used as a field name as-is.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && name != "_"
}

/// Rust string literal for `text`.
pub(crate) fn string_literal(text: &str) -> String {
    format!("{text:?}")
}

/// Driver entry for a native type, or a message naming the driver.
pub(crate) fn driver_type(driver: &dyn Driver, native: &str, what: &str) -> Result<NullableType, String> {
    driver.lookup_nullable_type(native).ok_or_else(|| {
        format!(
            "driver `{}` does not support type `{native}` of {what}",
            driver.name()
        )
    })
}

/// Argument expression binding a pattern argument as a query parameter.
pub(crate) fn bind_argument(driver: &dyn Driver, param: &PatternParam) -> Result<String, String> {
    if param.ty.starts_with('&') {
        return Ok(format!("&{}", param.name));
    }
    let native = option_inner(&param.ty).unwrap_or(&param.ty);
    let what = format!("argument `{}`", param.name);
    Ok(driver_type(driver, native, &what)?.encode(&param.name))
}

/// `T` in a compacted `Option<T>` type string.
fn option_inner(ty: &str) -> Option<&str> {
    ty.strip_prefix("Option<")?.strip_suffix('>')
}

/// `pub fn name(q: Q, args..) -> Result<R, qlgen::Error>` calling
/// `R::query` with `sql` and the bound arguments.
pub(crate) fn query_function(
    name: &str,
    executor: &PatternParam,
    args: &[PatternParam],
    output: &str,
    sql: &str,
    driver: &dyn Driver,
) -> Result<String, String> {
    let mut params = vec![format!("{}: {}", executor.name, executor.ty)];
    let executor_arg = if executor.ty.starts_with('&') {
        executor.name.clone()
    } else {
        format!("&{}", executor.name)
    };
    let mut bound = Vec::with_capacity(args.len());
    for arg in args {
        params.push(format!("{}: {}", arg.name, arg.ty));
        bound.push(bind_argument(driver, arg)?);
    }
    Ok(format!(
        "pub fn {name}({params}) -> Result<{output}, qlgen::Error> {{\n\
         const QUERY: &str = {sql};\n\
         {output}::query({executor}, QUERY, &[{bound}])\n\
         }}",
        params = params.join(", "),
        sql = string_literal(sql),
        executor = executor_arg,
        bound = bound.join(", "),
    ))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

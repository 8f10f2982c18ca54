//! Directive body options.
//!
//! A directive body is read, never run. Each statement must be a method-call
//! chain rooted at the marker parameter whose arguments are literals:
//!
//! ```text
//! gql.into("profiles").default("id").default("created_at");
//! gql.conflict("ON CONFLICT (email) DO NOTHING");
//! ```

use std::fmt;

use syn::ext::IdentExt;

/// A literal option argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    Str(String),
    Int(u64),
    Bool(bool),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Str(s) => write!(f, "{s:?}"),
            OptionValue::Int(n) => write!(f, "{n}"),
            OptionValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// One `.name(args..)` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionCall {
    pub name: String,
    pub args: Vec<OptionValue>,
}

/// Option calls of one directive body, in source order.
///
/// The `take_*` accessors consume the calls they read; [`Options::finish`]
/// rejects whatever is left.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    calls: Vec<OptionCall>,
}

impl Options {
    /// Read the option calls of `body`. `receiver` is the marker parameter's
    /// name; `None` when the parameter is `_`, which allows no options.
    pub fn parse(body: &syn::Block, receiver: Option<&str>) -> Result<Self, String> {
        let mut calls = Vec::new();
        for stmt in &body.stmts {
            let expr = match stmt {
                syn::Stmt::Expr(expr, _) => expr,
                _ => return Err("directive body may only contain option calls".to_string()),
            };
            let mut chain = Vec::new();
            read_chain(expr, receiver, &mut chain)?;
            calls.extend(chain);
        }
        Ok(Options { calls })
    }

    pub fn calls(&self) -> &[OptionCall] {
        &self.calls
    }

    fn take(&mut self, name: &str) -> Vec<OptionCall> {
        let (taken, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.calls)
            .into_iter()
            .partition(|call| call.name == name);
        self.calls = rest;
        taken
    }

    fn take_single(&mut self, name: &str) -> Result<Option<OptionValue>, String> {
        let mut taken = self.take(name);
        if taken.len() > 1 {
            return Err(format!("option `{name}` given more than once"));
        }
        match taken.pop() {
            Some(call) => single_arg(call).map(Some),
            None => Ok(None),
        }
    }

    /// A string option that may appear at most once.
    pub fn take_str(&mut self, name: &str) -> Result<Option<String>, String> {
        match self.take_single(name)? {
            Some(OptionValue::Str(s)) => Ok(Some(s)),
            Some(other) => Err(format!("option `{name}` expects a string, found {other}")),
            None => Ok(None),
        }
    }

    /// A string option that must appear exactly once.
    pub fn require_str(&mut self, name: &str) -> Result<String, String> {
        self.take_str(name)?
            .ok_or_else(|| format!("missing required option `{name}`"))
    }

    /// Every value of a repeatable string option, in source order.
    pub fn take_all_str(&mut self, name: &str) -> Result<Vec<String>, String> {
        self.take(name)
            .into_iter()
            .map(|call| match single_arg(call)? {
                OptionValue::Str(s) => Ok(s),
                other => Err(format!("option `{name}` expects a string, found {other}")),
            })
            .collect()
    }

    /// An integer option that may appear at most once.
    pub fn take_int(&mut self, name: &str) -> Result<Option<u64>, String> {
        match self.take_single(name)? {
            Some(OptionValue::Int(n)) => Ok(Some(n)),
            Some(other) => Err(format!("option `{name}` expects an integer, found {other}")),
            None => Ok(None),
        }
    }

    /// Reject options nothing consumed.
    pub fn finish(self) -> Result<(), String> {
        match self.calls.first() {
            Some(call) => Err(format!("unknown option `{}`", call.name)),
            None => Ok(()),
        }
    }
}

fn single_arg(mut call: OptionCall) -> Result<OptionValue, String> {
    if call.args.len() != 1 {
        return Err(format!(
            "option `{}` takes 1 argument, found {}",
            call.name,
            call.args.len()
        ));
    }
    call.args
        .pop()
        .ok_or_else(|| format!("option `{}` takes 1 argument", call.name))
}

/// Flatten `recv.a(..).b(..)` into `[a, b]`.
fn read_chain(
    expr: &syn::Expr,
    receiver: Option<&str>,
    out: &mut Vec<OptionCall>,
) -> Result<(), String> {
    match expr {
        syn::Expr::MethodCall(call) => {
            read_chain(&call.receiver, receiver, out)?;
            if call.turbofish.is_some() {
                return Err(format!("option `{}` takes no type arguments", call.method));
            }
            let args = call
                .args
                .iter()
                .map(|arg| literal(arg, &call.method))
                .collect::<Result<_, _>>()?;
            out.push(OptionCall {
                name: call.method.unraw().to_string(),
                args,
            });
            Ok(())
        }
        syn::Expr::Path(path) if path.qself.is_none() => {
            let is_receiver = path
                .path
                .get_ident()
                .zip(receiver)
                .is_some_and(|(ident, receiver)| ident.unraw() == receiver);
            if is_receiver {
                Ok(())
            } else {
                Err("options must be called on the marker parameter".to_string())
            }
        }
        syn::Expr::Paren(paren) => read_chain(&paren.expr, receiver, out),
        _ => Err("directive body may only contain option calls".to_string()),
    }
}

fn literal(expr: &syn::Expr, option: &syn::Ident) -> Result<OptionValue, String> {
    let syn::Expr::Lit(lit) = expr else {
        return Err(format!("option `{option}` takes literal arguments"));
    };
    match &lit.lit {
        syn::Lit::Str(s) => Ok(OptionValue::Str(s.value())),
        syn::Lit::Int(n) => n
            .base10_parse::<u64>()
            .map(OptionValue::Int)
            .map_err(|e| format!("option `{option}`: {e}")),
        syn::Lit::Bool(b) => Ok(OptionValue::Bool(b.value)),
        _ => Err(format!("option `{option}` takes string, integer or bool literals")),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

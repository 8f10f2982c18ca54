//! Pattern signatures.
//!
//! Directives other than structures describe the code they want through a
//! function-pointer parameter:
//!
//! ```text
//! pattern: fn(q: &Client, id: i64) -> ProfileScanner
//! ```

use qlgen_eval::type_string;
use syn::ext::IdentExt;

/// One named argument of a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternParam {
    pub name: String,
    /// Type as written (`&Client`, `Option<String>`).
    pub ty: String,
}

/// A parsed `fn(..) -> R` pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    pub params: Vec<PatternParam>,
    /// Return type, when the pattern has one.
    pub output: Option<String>,
}

impl Pattern {
    pub fn parse(ty: &syn::Type) -> Result<Self, String> {
        let syn::Type::BareFn(bare) = ty else {
            return Err("pattern must be a function type such as `fn(q: &Client) -> T`".to_string());
        };
        if bare.variadic.is_some() {
            return Err("pattern may not be variadic".to_string());
        }
        if bare.lifetimes.is_some() {
            return Err("pattern may not declare lifetimes".to_string());
        }

        let mut params: Vec<PatternParam> = Vec::with_capacity(bare.inputs.len());
        for (i, arg) in bare.inputs.iter().enumerate() {
            let Some((ident, _)) = &arg.name else {
                return Err(format!("pattern argument {} must be named", i + 1));
            };
            let name = ident.unraw().to_string();
            if name == "_" {
                return Err(format!("pattern argument {} must be named", i + 1));
            }
            if params.iter().any(|p| p.name == name) {
                return Err(format!("pattern argument `{name}` given more than once"));
            }
            params.push(PatternParam {
                name,
                ty: type_string(&arg.ty),
            });
        }

        let output = match &bare.output {
            syn::ReturnType::Default => None,
            syn::ReturnType::Type(_, ty) => Some(type_string(ty)),
        };

        Ok(Pattern { params, output })
    }

    /// The return type, which must be a plain type name.
    pub fn output_ident(&self) -> Result<&str, String> {
        let output = self
            .output
            .as_deref()
            .ok_or_else(|| "pattern must declare a return type".to_string())?;
        let is_ident = output.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
            && output.chars().all(|c| c.is_alphanumeric() || c == '_');
        if is_ident {
            Ok(output)
        } else {
            Err(format!("pattern return type `{output}` must be a type name"))
        }
    }

    /// The first argument (the query executor) and the rest.
    pub fn split_executor(&self) -> Result<(&PatternParam, &[PatternParam]), String> {
        self.params
            .split_first()
            .ok_or_else(|| "pattern must take the query executor as its first argument".to_string())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pattern(src: &str) -> Result<Pattern, String> {
        Pattern::parse(&syn::parse_str(src).unwrap())
    }

    #[test]
    fn test_parse_named_arguments() {
        let p = pattern("fn(q: &Client, id: i64, name: Option<String>) -> ProfileScanner").unwrap();
        let names: Vec<&str> = p.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["q", "id", "name"]);
        assert_eq!(p.params[0].ty, "&Client");
        assert_eq!(p.params[2].ty, "Option<String>");
        assert_eq!(p.output_ident().unwrap(), "ProfileScanner");
    }

    #[test]
    fn test_no_return_type() {
        let p = pattern("fn(p: Profile)").unwrap();
        assert_eq!(p.output, None);
        assert_eq!(
            p.output_ident().unwrap_err(),
            "pattern must declare a return type"
        );
    }

    #[test]
    fn test_return_type_must_be_a_name() {
        let p = pattern("fn(q: &Client) -> Vec<Profile>").unwrap();
        assert_eq!(
            p.output_ident().unwrap_err(),
            "pattern return type `Vec<Profile>` must be a type name"
        );
    }

    #[test]
    fn test_rejects_unnamed_and_non_fn() {
        assert_eq!(
            pattern("fn(i64)").unwrap_err(),
            "pattern argument 1 must be named"
        );
        assert!(pattern("Profile").is_err());
        assert_eq!(
            pattern("fn(a: i64, a: i64)").unwrap_err(),
            "pattern argument `a` given more than once"
        );
    }

    #[test]
    fn test_split_executor() {
        let p = pattern("fn() -> T").unwrap();
        assert!(p.split_executor().is_err());
        let p = pattern("fn(q: &Client, id: i64) -> T").unwrap();
        let (q, rest) = p.split_executor().unwrap();
        assert_eq!(q.name, "q");
        assert_eq!(rest.len(), 1);
    }
}

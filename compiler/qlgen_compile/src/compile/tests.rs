use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use qlgen_context::{Config, StandardDriver, StaticDialect};
use qlgen_directive::{DirectiveError, DirectiveKind, DirectiveRegistry};
use qlgen_eval::EvalError;

use super::*;

const SCHEMA: &str = r#"
[tables.profiles]
columns = [
    { name = "id", type = "int8", primary_key = true },
    { name = "email", type = "text", nullable = true },
]
"#;

const MODELS: &str = r#"#![cfg(qlgen)]

use qlgen::{Function, Scanner, Structure};
use crate::db::Client;

pub fn find_profile(gql: Function, pattern: fn(q: &Client, id: i64) -> ProfileScanner) {
    gql.query("SELECT id, email FROM profiles WHERE id = $1");
}

pub fn profile_scanner(gql: Scanner, pattern: fn(p: Profile)) {}

pub fn profile(gql: Structure) {
    gql.table("profiles");
}

pub fn helper(id: i64) -> i64 {
    id
}
"#;

fn collaborators() -> (Arc<dyn Dialect>, Arc<dyn Driver>) {
    let config = Config::parse(SCHEMA, Path::new("default.toml")).unwrap();
    let dialect = StaticDialect::from_config(&config).unwrap();
    (Arc::new(dialect), Arc::new(StandardDriver::new()))
}

fn package() -> Package {
    Package {
        import_path: "app::models".to_string(),
        name: "models".to_string(),
        dir: "/src/models".into(),
        files: vec!["lib.rs".to_string()],
        imports: BTreeSet::new(),
    }
}

fn source(name: &str, text: &str) -> SourceFile {
    SourceFile {
        name: name.to_string(),
        path: Path::new("/src/models").join(name),
        text: text.to_string(),
    }
}

fn compile(tagged: &[(&str, &str)]) -> Result<String, CompileError> {
    let sources = PackageSources {
        tagged: tagged.iter().map(|(name, text)| source(name, text)).collect(),
        normal: vec![source("lib.rs", "pub struct Account;\n")],
    };
    let (dialect, driver) = collaborators();
    let config = EvaluationConfig::new("default", "/project/.qlgen/default.toml");
    autocompile_package(&config, dialect, driver, &sources, &package())
}

#[test]
fn test_compiles_in_priority_order() {
    let out = compile(&[("queries.rs", MODELS)]).unwrap();

    assert!(out.starts_with(
        "//! Code generated by qlgen for `app::models` from default.toml. DO NOT EDIT.\n"
    ));
    assert!(out.contains("use super::*;\n"));
    assert!(out.contains("use crate::db::Client;\n"));
    assert!(!out.contains("qlgen::{"));

    let structure = out.find("pub struct Profile {").unwrap();
    let scanner = out.find("pub struct ProfileScanner {").unwrap();
    let function = out.find("pub fn find_profile(").unwrap();
    assert!(structure < scanner && scanner < function);

    assert!(!out.contains("fn helper"));
    assert!(!out.contains("fn profile("));
}

#[test]
fn test_compile_is_deterministic() {
    let first = compile(&[("queries.rs", MODELS)]).unwrap();
    let second = compile(&[("queries.rs", MODELS)]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_directives_across_files() {
    let structs = "#![cfg(qlgen)]\nuse qlgen::Structure;\npub fn profile(gql: Structure) { gql.table(\"profiles\"); }\n";
    let scanners = "#![cfg(qlgen)]\nuse qlgen::Scanner;\npub fn profile_scanner(gql: Scanner, pattern: fn(p: Profile)) {}\n";
    // The scanner file sorts first but still runs after the structure.
    let out = compile(&[("a_scanners.rs", scanners), ("b_structs.rs", structs)]).unwrap();
    assert!(out.find("pub struct Profile {").unwrap() < out.find("pub struct ProfileScanner").unwrap());
}

#[test]
fn test_no_directives_yields_header_only() {
    let out = compile(&[("queries.rs", "#![cfg(qlgen)]\npub fn helper() {}\n")]).unwrap();
    assert!(out.starts_with("//! Code generated by qlgen for `app::models`"));
    assert!(out.trim_end().ends_with("use super::*;"));
    assert!(!out.contains("fn "));
}

#[test]
fn test_reverse_priority_fails_at_scanner() {
    let file = syn::parse_file(MODELS).unwrap();
    let mut results = DirectiveRegistry::new().match_file(Path::new("queries.rs"), &file);
    results.retain(|r| r.kind != DirectiveKind::Function);
    results.sort_by_key(|r| std::cmp::Reverse(r.priority));
    assert_eq!(results[0].kind, DirectiveKind::Scanner);

    let (dialect, driver) = collaborators();
    let scope = Arc::new(Scope::new());
    let header = package_header("app::models", "default.toml", [&file]);
    let err = compile_fragments(results, &header, &scope, dialect.as_ref(), driver.as_ref())
        .unwrap_err();

    assert!(matches!(
        err,
        CompileError::Fragment {
            source: DirectiveError::Generate {
                kind: DirectiveKind::Scanner,
                ..
            },
            ..
        }
    ));
    assert_eq!(err.location().unwrap().line, 10);
}

#[test]
fn test_malformed_directive_surfaces_last() {
    let text = r#"#![cfg(qlgen)]
use qlgen::{Function, Structure};

pub fn broken(gql: Function, pattern: fn(q: &Client) -> Profile) {}

pub fn profile(gql: Structure) {
    gql.table("profiles");
}
"#;
    let err = compile(&[("queries.rs", text)]).unwrap_err();
    let CompileError::Fragment { location, source } = &err else {
        panic!("expected a fragment error, got {err:?}");
    };
    assert_eq!(location.line, 4);
    assert!(matches!(source, DirectiveError::Malformed { .. }));
    assert_eq!(
        err.to_string(),
        "/src/models/queries.rs:4:8: malformed Function directive `broken`: missing required option `query`"
    );
}

#[test]
fn test_unresolved_reference_reports_fragment() {
    let text = r#"#![cfg(qlgen)]
use qlgen::Function;

pub fn find(gql: Function, pattern: fn(q: &Client, id: i64) -> MissingScanner) {
    gql.query("SELECT 1");
}
"#;
    let err = compile(&[("queries.rs", text)]).unwrap_err();
    let CompileError::Evaluation {
        fragment, source, ..
    } = &err
    else {
        panic!("expected an evaluation error, got {err:?}");
    };
    assert!(fragment.starts_with("pub fn find("));
    assert!(matches!(
        source,
        EvalError::Unresolved { name, .. } if name == "Client" || name == "MissingScanner"
    ));
    assert_eq!(err.fragment(), Some(fragment.as_str()));
}

#[test]
fn test_redefinition_is_rejected() {
    let text = r#"#![cfg(qlgen)]
use qlgen::Structure;

pub fn profile(gql: Structure) { gql.table("profiles"); }
pub fn Profile(gql: Structure) { gql.table("profiles"); }
"#;
    let err = compile(&[("queries.rs", text)]).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Evaluation {
            source: EvalError::Redefinition { .. },
            ..
        }
    ));
    assert_eq!(err.location().unwrap().line, 5);
}

#[test]
fn test_parse_error_in_tagged_file() {
    let err = compile(&[("queries.rs", "pub fn (")]).unwrap_err();
    assert!(matches!(err, CompileError::Parse { .. }));
    assert!(err.location().is_none());
}

use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use qlgen_context::{StandardDriver, StaticDialect};
use qlgen_eval::{EvalContext, Scope};

use super::*;
use crate::errors::DirectiveError;
use crate::kind::Priority;

fn match_source(source: &str) -> Vec<CompileResult> {
    let file = syn::parse_file(source).unwrap();
    DirectiveRegistry::new().match_file(Path::new("src/db/queries.rs"), &file)
}

fn malformed_reason(result: CompileResult) -> String {
    assert!(result.is_malformed(), "{result:?}");
    let eval = EvalContext::new(Arc::new(Scope::new()));
    let dialect = StaticDialect::default();
    let driver = StandardDriver::new();
    let env = GenerationEnv {
        eval: &eval,
        dialect: &dialect,
        driver: &driver,
    };
    match result.generate(&env).unwrap_err() {
        DirectiveError::Malformed { reason, .. } => reason,
        other => panic!("expected a malformed directive, got {other:?}"),
    }
}

#[test]
fn test_registry_covers_every_kind() {
    let registry = DirectiveRegistry::new();
    assert_eq!(registry.len(), 6);
    assert!(!registry.is_empty());
    for kind in registry.kinds() {
        assert_eq!(registry.get(kind).kind(), kind);
    }
}

#[test]
fn test_ordinary_items_are_ignored() {
    let results = match_source(
        r"
        use qlgen::Structure;
        pub struct Structure2;
        pub fn helper(x: i64) -> i64 { x }
        pub fn no_params() {}
        impl Foo { pub fn method(gql: Structure) {} }
        ",
    );
    assert!(results.is_empty());
}

#[test]
fn test_unimported_marker_is_not_a_directive() {
    let results = match_source(r#"pub fn profile(gql: Structure) { gql.table("profiles"); }"#);
    assert!(results.is_empty());
}

#[test]
fn test_match_in_source_order_with_location() {
    let results = match_source(
        r#"use qlgen::{Function, Structure};

pub fn find(gql: Function, pattern: fn(q: &C) -> S) { gql.query("SELECT 1"); }

pub fn profile(gql: qlgen::Structure) {
    gql.table("profiles");
}
"#,
    );
    let summary: Vec<(&str, DirectiveKind, Priority)> = results
        .iter()
        .map(|r| (r.name.as_str(), r.kind, r.priority))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("find", DirectiveKind::Function, Priority::FUNCTION),
            ("profile", DirectiveKind::Structure, Priority::STRUCTURE),
        ]
    );
    assert_eq!(results[1].location.to_string(), "src/db/queries.rs:5:8");
}

#[test]
fn test_renamed_marker() {
    let results = match_source(
        "use qlgen::Scanner as Rows;\npub fn profile_scanner(gql: Rows, pattern: fn(p: Profile)) {}",
    );
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind, DirectiveKind::Scanner);
    assert!(!results[0].is_malformed());
}

#[test]
fn test_malformed_structure_with_params() {
    let mut results = match_source(
        r#"use qlgen::Structure; pub fn profile(gql: Structure, extra: i64) { gql.table("p"); }"#,
    );
    let result = results.pop().unwrap();
    assert_eq!(result.priority, Priority::MALFORMED);
    assert_eq!(
        malformed_reason(result),
        "expected no parameters after the marker, found 1"
    );
}

#[test]
fn test_malformed_structure_options() {
    let cases = [
        ("{}", "exactly one of `table` or `query` is required"),
        (
            r#"{ gql.table("a").query("SELECT 1"); }"#,
            "exactly one of `table` or `query` is required",
        ),
        (r#"{ gql.table("a").colour("red"); }"#, "unknown option `colour`"),
    ];
    for (body, reason) in cases {
        let mut results = match_source(&format!(
            "use qlgen::Structure; pub fn profile(gql: Structure) {body}"
        ));
        assert_eq!(malformed_reason(results.pop().unwrap()), reason, "{body}");
    }
}

#[test]
fn test_malformed_function_shapes() {
    let cases = [
        (
            "pub fn f(gql: Function) { gql.query(\"SELECT 1\"); }",
            "missing pattern parameter after the marker",
        ),
        (
            "pub fn f(gql: Function, pattern: fn(q: &C)) { gql.query(\"SELECT 1\"); }",
            "pattern must declare a return type",
        ),
        (
            "pub fn f(gql: Function, pattern: fn(q: &C) -> S) {}",
            "missing required option `query`",
        ),
        (
            "pub fn f<T>(gql: Function, pattern: fn(q: &T) -> S) { gql.query(\"SELECT 1\"); }",
            "directive may not be generic",
        ),
        (
            "pub async fn f(gql: Function, pattern: fn(q: &C) -> S) { gql.query(\"SELECT 1\"); }",
            "directive must be a plain `fn`",
        ),
    ];
    for (item, reason) in cases {
        let mut results = match_source(&format!("use qlgen::Function; {item}"));
        assert_eq!(malformed_reason(results.pop().unwrap()), reason, "{item}");
    }
}

#[test]
fn test_malformed_insert_batch_size() {
    let mut results = match_source(
        r#"use qlgen::InsertBatch;
        pub fn f(gql: InsertBatch, pattern: fn(q: &C, r: R) -> S) { gql.into("t").batch(0); }"#,
    );
    assert_eq!(
        malformed_reason(results.pop().unwrap()),
        "batch size must be at least 1"
    );
}

#[test]
fn test_malformed_error_message_names_directive() {
    let mut results = match_source("use qlgen::Scanner; pub fn rows(gql: Scanner) {}");
    let result = results.pop().unwrap();
    let eval = EvalContext::new(Arc::new(Scope::new()));
    let dialect = StaticDialect::default();
    let driver = StandardDriver::new();
    let env = GenerationEnv {
        eval: &eval,
        dialect: &dialect,
        driver: &driver,
    };
    let err = result.generate(&env).unwrap_err();
    assert_eq!(
        err.to_string(),
        "malformed Scanner directive `rows`: missing pattern parameter after the marker"
    );
}

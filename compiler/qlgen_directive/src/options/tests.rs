use pretty_assertions::assert_eq;

use super::*;

fn options(body: &str) -> Result<Options, String> {
    let block: syn::Block = syn::parse_str(body).unwrap();
    Options::parse(&block, Some("gql"))
}

#[test]
fn test_chain_and_statements() {
    let opts = options(r#"{ gql.into("t").default("id"); gql.default("at"); gql.batch(10); }"#)
        .unwrap();
    let names: Vec<&str> = opts.calls().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["into", "default", "default", "batch"]);
}

#[test]
fn test_accessors_consume() {
    let mut opts =
        options(r#"{ gql.into("t").default("id").default("at").batch(3) }"#).unwrap();
    assert_eq!(opts.require_str("into").unwrap(), "t");
    assert_eq!(
        opts.take_all_str("default").unwrap(),
        vec!["id".to_string(), "at".to_string()]
    );
    assert_eq!(opts.take_int("batch").unwrap(), Some(3));
    assert_eq!(opts.take_str("conflict").unwrap(), None);
    assert!(opts.finish().is_ok());
}

#[test]
fn test_unknown_option() {
    let mut opts = options(r#"{ gql.table("t").colour("red"); }"#).unwrap();
    opts.take_str("table").unwrap();
    assert_eq!(opts.finish().unwrap_err(), "unknown option `colour`");
}

#[test]
fn test_repeated_single_option() {
    let mut opts = options(r#"{ gql.table("a").table("b"); }"#).unwrap();
    assert_eq!(
        opts.take_str("table").unwrap_err(),
        "option `table` given more than once"
    );
}

#[test]
fn test_wrong_literal_type() {
    let mut opts = options(r#"{ gql.batch("ten"); }"#).unwrap();
    assert_eq!(
        opts.take_int("batch").unwrap_err(),
        "option `batch` expects an integer, found \"ten\""
    );
}

#[test]
fn test_missing_required() {
    let mut opts = options("{}").unwrap();
    assert_eq!(
        opts.require_str("query").unwrap_err(),
        "missing required option `query`"
    );
}

#[test]
fn test_rejects_non_literals_and_other_receivers() {
    let table = r#"{ let t = "x"; gql.table(t); }"#;
    assert!(options(table).is_err());
    assert_eq!(
        options(r#"{ gql.table(NAME); }"#).unwrap_err(),
        "option `table` takes literal arguments"
    );
    assert_eq!(
        options(r#"{ other.table("t"); }"#).unwrap_err(),
        "options must be called on the marker parameter"
    );
}

#[test]
fn test_underscore_receiver_allows_nothing() {
    let block: syn::Block = syn::parse_str(r#"{ gql.table("t"); }"#).unwrap();
    assert!(Options::parse(&block, None).is_err());
    let empty: syn::Block = syn::parse_str("{}").unwrap();
    assert!(Options::parse(&empty, None).unwrap().calls().is_empty());
}

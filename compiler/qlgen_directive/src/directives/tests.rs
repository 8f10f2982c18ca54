use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use qlgen_context::{Config, StandardDriver, StaticDialect};
use qlgen_eval::{format, EvalContext, Scope};

use super::*;
use crate::errors::DirectiveError;
use crate::registry::{DirectiveRegistry, GenerationEnv};

const SCHEMA: &str = r#"
[tables.profiles]
columns = [
    { name = "id", type = "int8", primary_key = true },
    { name = "email", type = "text", nullable = true },
]

[tables.events]
columns = [
    { name = "id", type = "int8" },
    { name = "type", type = "text" },
]

[queries.emails]
sql = "SELECT email FROM profiles"
columns = [{ name = "email", type = "text" }]
"#;

const HEADER: &str = "use qlgen::{Function, Insert, InsertBatch, QueryAutogen, Scanner, Structure};\n\
                      pub struct Client;\n";

/// Generate every directive in `source`, in priority order, validating each
/// fragment like the package compiler does. Returns the fragments.
fn generate(source: &str) -> Result<Vec<String>, DirectiveError> {
    let config = Config::parse(SCHEMA, Path::new("default.toml")).unwrap();
    let dialect = StaticDialect::from_config(&config).unwrap();
    let driver = StandardDriver::new();

    let file = syn::parse_file(&format!("{HEADER}{source}")).unwrap();
    let package = Arc::new(Scope::from_files([&file]));
    let mut results = DirectiveRegistry::new().match_file(Path::new("db.rs"), &file);
    results.sort_by_key(|r| r.priority);

    let mut eval = EvalContext::new(Arc::clone(&package));
    let mut buffer = String::new();
    let mut fragments = Vec::new();
    for result in results {
        let env = GenerationEnv {
            eval: &eval,
            dialect: &dialect,
            driver: &driver,
        };
        let fragment = result.generate(&env)?;
        buffer.push_str(&fragment);
        buffer.push_str("\n\n");
        buffer = format(&buffer).unwrap();
        eval = EvalContext::load(Arc::clone(&package), &buffer)
            .unwrap_or_else(|e| panic!("fragment failed validation: {e}\n{fragment}"));
        fragments.push(fragment);
    }
    Ok(fragments)
}

fn generate_one(source: &str) -> String {
    generate(source).unwrap().pop().unwrap()
}

#[test]
fn test_names() {
    assert_eq!(type_name("profile_scanner"), "ProfileScanner");
    assert_eq!(fn_ident("findProfile"), "find_profile");
    assert_eq!(ident("type"), "r#type");
    assert_eq!(ident("email"), "email");
    assert!(is_identifier("created_at"));
    assert!(!is_identifier("created at"));
    assert!(!is_identifier("1st"));
}

#[test]
fn test_structure_from_table() {
    let out = generate_one(r#"pub fn profile(gql: Structure) { gql.table("profiles"); }"#);
    assert_eq!(
        out,
        "#[derive(Clone, Debug, Default, PartialEq)]\n\
         pub struct Profile {\n    pub id: i64,\n    pub email: Option<String>,\n}"
    );
}

#[test]
fn test_structure_from_query_with_comment() {
    let out = generate_one(
        r#"pub fn email_row(gql: Structure) { gql.query("SELECT email FROM profiles").comment("An email."); }"#,
    );
    assert!(out.starts_with("/// An email.\n"));
    assert!(out.contains("pub struct EmailRow {\n    pub email: String,\n}"));
}

#[test]
fn test_structure_keyword_column() {
    let out = generate_one(r#"pub fn event(gql: Structure) { gql.table("events"); }"#);
    assert!(out.contains("pub r#type: String,"));
}

#[test]
fn test_structure_unknown_table() {
    let err = generate(r#"pub fn missing(gql: Structure) { gql.table("missing"); }"#).unwrap_err();
    assert_eq!(err.to_string(), "Structure directive `missing`: dialect error");
}

#[test]
fn test_scanner_over_structure() {
    let fragments = generate(
        r#"
        pub fn profile_scanner(gql: Scanner, pattern: fn(p: Profile)) {}
        pub fn profile(gql: Structure) { gql.table("profiles"); }
        "#,
    )
    .unwrap();
    assert_eq!(fragments.len(), 2);
    let scanner = &fragments[1];
    assert!(scanner.contains("pub struct ProfileScanner {"));
    assert!(scanner.contains("pub fn scan(row: &qlgen::Row) -> Result<Profile, qlgen::Error> {"));
    assert!(scanner.contains(
        r#"Ok(Profile { id: qlgen::required(row.get("id")?, "id")?, email: row.get("email")? })"#
    ));
    assert!(scanner.contains("impl Iterator for ProfileScanner {"));
}

#[test]
fn test_scanner_tuple() {
    let out = generate_one(r#"pub fn pairs(gql: Scanner, pattern: fn(id: i64, email: Option<String>)) {}"#);
    assert!(out.contains("Result<(i64, Option<String>), qlgen::Error>"));
    assert!(out.contains(r#"Ok((qlgen::required(row.get("id")?, "id")?, row.get("email")?))"#));
}

#[test]
fn test_scanner_before_structure_is_undefined() {
    // Without the structure directive the struct does not exist yet.
    let err = generate(r#"pub fn profile_scanner(gql: Scanner, pattern: fn(p: Profile)) {}"#)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Scanner directive `profile_scanner`: type `Profile` is not defined"
    );
}

#[test]
fn test_function() {
    let fragments = generate(
        r#"
        pub fn find_profile(gql: Function, pattern: fn(q: &Client, id: i64) -> ProfileScanner) {
            gql.query("SELECT id, email FROM profiles WHERE id = $1");
        }
        pub fn profile_scanner(gql: Scanner, pattern: fn(p: Profile)) {}
        pub fn profile(gql: Structure) { gql.table("profiles"); }
        "#,
    )
    .unwrap();
    assert_eq!(
        fragments[2],
        "pub fn find_profile(q: &Client, id: i64) -> Result<ProfileScanner, qlgen::Error> {\n\
         const QUERY: &str = \"SELECT id, email FROM profiles WHERE id = $1\";\n\
         ProfileScanner::query(q, QUERY, &[&id])\n\
         }"
    );
}

#[test]
fn test_function_unknown_argument_type() {
    let err = generate(
        r#"pub fn f(gql: Function, pattern: fn(q: &Client, at: Instant) -> Rows) { gql.query("SELECT 1"); }"#,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Function directive `f`: driver `standard` does not support type `Instant` of argument `at`"
    );
}

#[test]
fn test_query_autogen() {
    let fragments = generate(
        r#"
        pub fn profile(gql: Structure) { gql.table("profiles"); }
        pub fn profile_scanner(gql: Scanner, pattern: fn(p: Profile)) {}
        pub fn profile_by_id(gql: QueryAutogen, pattern: fn(q: &Client, id: i64) -> ProfileScanner) {
            gql.from("profiles");
        }
        "#,
    )
    .unwrap();
    assert!(fragments[2].contains(r#"const QUERY: &str = "SELECT id, email FROM profiles WHERE id = $1";"#));
}

#[test]
fn test_query_autogen_unknown_key() {
    let err = generate(
        r#"pub fn by_name(gql: QueryAutogen, pattern: fn(q: &Client, name: String) -> Rows) { gql.from("profiles"); }"#,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "QueryAutogen directive `by_name`: table `profiles` has no column `name`"
    );
}

const PROFILE_PRELUDE: &str = r#"
    pub fn profile(gql: Structure) { gql.table("profiles"); }
    pub fn profile_scanner(gql: Scanner, pattern: fn(p: Profile)) {}
"#;

#[test]
fn test_insert() {
    let fragments = generate(&format!(
        r#"{PROFILE_PRELUDE}
        pub fn insert_profile(gql: Insert, pattern: fn(q: &Client, p: Profile) -> ProfileScanner) {{
            gql.into("profiles").default("id");
        }}
        "#
    ))
    .unwrap();
    assert_eq!(
        fragments[2],
        "pub fn insert_profile(q: &Client, p: &Profile) -> Result<ProfileScanner, qlgen::Error> {\n\
         const QUERY: &str = \"INSERT INTO profiles (id, email) VALUES (DEFAULT, $1) RETURNING id, email\";\n\
         ProfileScanner::query(q, QUERY, &[&p.email])\n\
         }"
    );
}

#[test]
fn test_insert_batch() {
    let fragments = generate(&format!(
        r#"{PROFILE_PRELUDE}
        pub fn insert_profiles(gql: InsertBatch, pattern: fn(q: &Client, rows: Profile) -> ProfileScanner) {{
            gql.into("profiles").batch(2).conflict("ON CONFLICT DO NOTHING");
        }}
        "#
    ))
    .unwrap();
    let out = &fragments[2];
    assert!(out.contains("rows: &[Profile]) -> Result<Vec<ProfileScanner>, qlgen::Error>"));
    assert!(out.contains("const QUERIES: [&str; 2]"));
    assert!(out.contains(
        "\"INSERT INTO profiles (id, email) VALUES ($1, $2), ($3, $4) ON CONFLICT DO NOTHING RETURNING id, email\""
    ));
    assert!(out.contains("values.push(&record.id);\nvalues.push(&record.email);\n"));
    assert!(out.contains("QUERIES[chunk.len() - 1]"));
}

#[test]
fn test_insert_default_must_be_a_field() {
    let err = generate(&format!(
        r#"{PROFILE_PRELUDE}
        pub fn insert_profile(gql: Insert, pattern: fn(q: &Client, p: Profile) -> ProfileScanner) {{
            gql.into("profiles").default("created_at");
        }}
        "#
    ))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Insert directive `insert_profile`: default column `created_at` is not a field of `Profile`"
    );
}

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

fn write(dir: &TempDir, path: &str, text: &str) {
    let path = dir.path().join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// `shop` with `orders` importing `customers`; both carry directives.
fn project() -> TempDir {
    let dir = tempdir().unwrap();
    write(&dir, "Cargo.toml", "[package]\nname = \"shop\"\nversion = \"0.1.0\"\n");
    write(
        &dir,
        ".qlgen/default.toml",
        "[tables.customers]\ncolumns = [{ name = \"id\", type = \"int8\" }]\n\n\
         [tables.orders]\ncolumns = [{ name = \"id\", type = \"int8\" }, { name = \"customer\", type = \"int8\" }]\n",
    );
    write(&dir, "src/lib.rs", "pub mod customers;\npub mod orders;\n");
    write(&dir, "src/customers/mod.rs", "pub struct Marker;\n");
    write(
        &dir,
        "src/customers/gen.rs",
        "#![cfg(qlgen)]\nuse qlgen::Structure;\npub fn customer(gql: Structure) { gql.table(\"customers\"); }\n",
    );
    write(&dir, "src/orders/mod.rs", "use crate::customers::Marker;\n");
    write(
        &dir,
        "src/orders/gen.rs",
        "#![cfg(qlgen)]\nuse qlgen::Structure;\nuse shop::customers::Customer;\npub fn order(gql: Structure) { gql.table(\"orders\"); }\n",
    );
    dir
}

fn options_for(dir: &TempDir, extra: &[&str]) -> GenerateOptions {
    let mut list = vec![dir.path().to_str().unwrap()];
    list.extend_from_slice(extra);
    parse_generate_options(&args(&list)).unwrap()
}

#[test]
fn test_defaults() {
    let options = parse_generate_options(&[]).unwrap();
    assert_eq!(options, GenerateOptions::default());
    assert_eq!(options.config, "default");
    assert_eq!(options.output, PathBuf::from("qlgen.rs"));
    assert!(options.parallel);
}

#[test]
fn test_all_flags() {
    let options = parse_generate_options(&args(&[
        "--config=dev",
        "--output=models_gen.rs",
        "--module=shop",
        "--threads=4",
        "--no-parallel",
        "--skip-dependents",
        "-v",
        "project",
    ]))
    .unwrap();
    assert_eq!(
        options,
        GenerateOptions {
            path: PathBuf::from("project"),
            config: "dev".to_string(),
            output: PathBuf::from("models_gen.rs"),
            module: Some("shop".to_string()),
            threads: 4,
            parallel: false,
            upstream: UpstreamFailure::Skip,
            verbose: true,
        }
    );
}

#[test]
fn test_bad_flags() {
    let err = |list: &[&str]| parse_generate_options(&args(list)).unwrap_err();
    assert_eq!(err(&["--threads=many"]), "`--threads=` expects a number, got `many`");
    assert_eq!(err(&["--jobs=2"]), "unknown option `--jobs=2`");
    assert_eq!(err(&["a", "b"]), "unexpected argument `b`");
    assert_eq!(err(&["--config="]), "`--config=` needs a configuration name");
    assert!(err(&["--output=src/gen.rs"]).starts_with("`--output=` must be a plain file name"));
}

#[test]
fn test_plan_levels() {
    let dir = project();
    let levels = plan_levels(&options_for(&dir, &[])).unwrap();
    assert_eq!(
        levels,
        vec![
            vec!["shop::customers".to_string()],
            vec!["shop::orders".to_string()],
        ]
    );
    assert!(!dir.path().join("src/orders/qlgen.rs").exists());
}

#[test]
fn test_generate_writes_files() {
    let dir = project();
    let outputs = run_generate(&options_for(&dir, &["--output=db_gen.rs"])).unwrap();
    assert_eq!(
        outputs.keys().collect::<Vec<_>>(),
        vec!["shop::customers", "shop::orders"]
    );
    let orders = fs::read_to_string(dir.path().join("src/orders/db_gen.rs")).unwrap();
    assert!(orders.contains("use shop::customers::Customer;"));
    assert!(orders.contains("pub struct Order {"));
}

#[test]
fn test_unknown_config_is_reported() {
    let dir = project();
    let err = run_generate(&options_for(&dir, &["--config=prod"])).unwrap_err();
    assert!(matches!(err, CommandError::Graph(GraphError::Compile { .. })));
}

#[test]
fn test_missing_project() {
    let dir = tempdir().unwrap();
    let err = plan_levels(&options_for(&dir, &[])).unwrap_err();
    assert!(matches!(err, CommandError::Project(ProjectError::NoSources { .. })));
}

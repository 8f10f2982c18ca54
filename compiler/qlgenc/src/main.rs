//! qlgen CLI
//!
//! Generates query code for the packages of a Rust project.

use qlgenc::commands::{parse_generate_options, plan_levels, report_error, run_generate};
use qlgenc::init_tracing;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "generate" | "levels" => {
            let options = match parse_generate_options(&args[2..]) {
                Ok(options) => options,
                Err(message) => {
                    eprintln!("error: {message}");
                    eprintln!();
                    eprintln!("Usage: qlgen {command} [path] [options]");
                    eprintln!("Run `qlgen help` for the list of options.");
                    std::process::exit(2);
                }
            };
            init_tracing(options.verbose);

            if command == "generate" {
                match run_generate(&options) {
                    Ok(outputs) => {
                        for import_path in outputs.keys() {
                            println!("generated {import_path}");
                        }
                        if outputs.is_empty() {
                            println!("nothing to generate");
                        }
                    }
                    Err(err) => {
                        report_error(&err);
                        std::process::exit(1);
                    }
                }
            } else {
                match plan_levels(&options) {
                    Ok(levels) => {
                        for (index, level) in levels.iter().enumerate() {
                            println!("level {index}: {}", level.join(", "));
                        }
                    }
                    Err(err) => {
                        report_error(&err);
                        std::process::exit(1);
                    }
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("qlgen {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("qlgen (query code generator)");
    println!();
    println!("Usage: qlgen <command> [path] [options]");
    println!();
    println!("Commands:");
    println!("  generate [path]      Generate code for every package with directives");
    println!("  levels [path]        Show the order packages would be generated in");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --config=<name>      Configuration in .qlgen/<name>.toml (default: default)");
    println!("  --output=<file>      Generated file name in each package (default: qlgen.rs)");
    println!("  --module=<path>      Module path (default: package name from Cargo.toml)");
    println!("  --threads=<n>        Worker threads (default: one per core)");
    println!("  --no-parallel        Generate packages one at a time");
    println!("  --skip-dependents    Do not generate packages whose dependency failed");
    println!("  --verbose, -v        Debug logging (RUST_LOG overrides)");
    println!();
    println!("Examples:");
    println!("  qlgen generate");
    println!("  qlgen generate --config=dev --output=db.rs");
    println!("  qlgen levels path/to/project");
}

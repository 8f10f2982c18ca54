//! Command handlers for the qlgen CLI.
//!
//! `generate` runs the whole graph and writes files; `levels` stops after
//! leveling and reports the order packages would be generated in.

use std::error::Error;
use std::path::{Path, PathBuf};

use qlgen_context::DEFAULT_CONFIG;
use qlgen_graph::{
    autocompile_graph, CycleError, DependencyGraph, GraphError, GraphOptions, Outputs,
    UpstreamFailure,
};
use qlgen_package::{discover_packages, PackageError};

use crate::project::{Project, ProjectError};

/// Generated file name used when `--output=` is not given.
pub const DEFAULT_OUTPUT: &str = "qlgen.rs";

/// Options shared by `generate` and `levels`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Project directory (default: current directory).
    pub path: PathBuf,
    pub config: String,
    pub output: PathBuf,
    pub module: Option<String>,
    pub threads: usize,
    pub parallel: bool,
    pub upstream: UpstreamFailure,
    pub verbose: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            path: PathBuf::from("."),
            config: DEFAULT_CONFIG.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            module: None,
            threads: 0,
            parallel: true,
            upstream: UpstreamFailure::Warn,
            verbose: false,
        }
    }
}

/// Parse the arguments following the command name.
pub fn parse_generate_options(args: &[String]) -> Result<GenerateOptions, String> {
    let mut options = GenerateOptions::default();
    let mut path: Option<&str> = None;

    for arg in args {
        if let Some(config) = arg.strip_prefix("--config=") {
            if config.is_empty() {
                return Err("`--config=` needs a configuration name".to_string());
            }
            options.config = config.to_string();
        } else if let Some(output) = arg.strip_prefix("--output=") {
            let output = Path::new(output);
            if output.file_name().is_none() || output.components().count() != 1 {
                return Err(format!(
                    "`--output=` must be a plain file name, got `{}`",
                    output.display()
                ));
            }
            options.output = output.to_path_buf();
        } else if let Some(module) = arg.strip_prefix("--module=") {
            options.module = Some(module.to_string());
        } else if let Some(threads) = arg.strip_prefix("--threads=") {
            options.threads = threads
                .parse()
                .map_err(|_| format!("`--threads=` expects a number, got `{threads}`"))?;
        } else if arg == "--no-parallel" {
            options.parallel = false;
        } else if arg == "--skip-dependents" {
            options.upstream = UpstreamFailure::Skip;
        } else if arg == "--verbose" || arg == "-v" {
            options.verbose = true;
        } else if arg.starts_with('-') {
            return Err(format!("unknown option `{arg}`"));
        } else if path.is_none() {
            path = Some(arg);
        } else {
            return Err(format!("unexpected argument `{arg}`"));
        }
    }

    if let Some(path) = path {
        options.path = PathBuf::from(path);
    }
    Ok(options)
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error("failed to load package")]
    Discover(#[source] PackageError),
    #[error(transparent)]
    Cycle(#[from] CycleError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl GenerateOptions {
    fn graph_options(&self, project: &Project) -> GraphOptions {
        GraphOptions {
            config_dir: project.config_dir(),
            parallel: self.parallel,
            threads: self.threads,
            upstream: self.upstream,
            ..GraphOptions::default()
        }
    }
}

/// Generate every package of the project that carries directives.
pub fn run_generate(options: &GenerateOptions) -> Result<Outputs, CommandError> {
    let project = Project::load(&options.path, options.module.as_deref())?;
    let build = project.build_context();
    let candidates = discover_packages(&build);
    tracing::debug!(candidates = candidates.len(), "discovered packages");

    let outputs = autocompile_graph(
        &options.config,
        &build,
        &options.output,
        &candidates,
        &options.graph_options(&project),
    )?;
    Ok(outputs)
}

/// The levels `generate` would run, as import paths.
pub fn plan_levels(options: &GenerateOptions) -> Result<Vec<Vec<String>>, CommandError> {
    let project = Project::load(&options.path, options.module.as_deref())?;
    let build = project.build_context();
    let candidates = discover_packages(&build);
    let graph = DependencyGraph::discover(&build, &candidates).map_err(CommandError::Discover)?;
    let levels = graph.levelize()?;
    Ok(levels
        .iter()
        .map(|level| {
            level
                .import_paths(&graph)
                .into_iter()
                .map(ToString::to_string)
                .collect()
        })
        .collect())
}

/// Print `err` and its sources to stderr.
pub fn report_error(err: &dyn Error) {
    eprintln!("error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

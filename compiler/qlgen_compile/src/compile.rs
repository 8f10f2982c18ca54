//! The incremental package compiler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use qlgen_context::{Dialect, Driver, GeneratorContext};
use qlgen_directive::{CompileResult, DirectiveRegistry, GenerationEnv};
use qlgen_eval::{format, EvalContext, Scope};
use qlgen_package::{Package, PackageSources, SourceFile};

use crate::errors::CompileError;
use crate::header::package_header;

/// The configuration a compile runs under, recorded in the generated header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationConfig {
    pub name: String,
    pub path: PathBuf,
}

impl EvaluationConfig {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        EvaluationConfig {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn from_context(ctx: &GeneratorContext) -> Self {
        EvaluationConfig::new(ctx.name(), ctx.config_path())
    }

    /// File name shown in the header.
    fn display_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or_else(|| self.name.clone(), ToString::to_string)
    }
}

fn parse_source(file: &SourceFile) -> Result<syn::File, CompileError> {
    syn::parse_file(&file.text).map_err(|e| CompileError::Parse {
        path: file.path.clone(),
        message: e.to_string(),
    })
}

/// Compile the directives of one package into the text of its generated
/// file.
///
/// Directives from every tagged file are run in priority order (source order
/// within a priority). After each fragment the whole buffer is reformatted
/// and reloaded; the first failure aborts the package.
#[tracing::instrument(level = "debug", skip_all, fields(package = %package.import_path))]
pub fn autocompile_package(
    config: &EvaluationConfig,
    dialect: Arc<dyn Dialect>,
    driver: Arc<dyn Driver>,
    sources: &PackageSources,
    package: &Package,
) -> Result<String, CompileError> {
    let registry = DirectiveRegistry::new();

    let tagged: Vec<(&Path, syn::File)> = sources
        .tagged
        .iter()
        .map(|file| Ok((file.path.as_path(), parse_source(file)?)))
        .collect::<Result<_, CompileError>>()?;
    let mut results: Vec<_> = tagged
        .iter()
        .flat_map(|(path, syntax)| registry.match_file(path, syntax))
        .collect();
    results.sort_by_key(|result| result.priority);
    tracing::debug!(directives = results.len(), "collected directives");

    let normal: Vec<syn::File> = sources
        .normal
        .iter()
        .map(parse_source)
        .collect::<Result<_, _>>()?;
    let scope = Arc::new(Scope::from_files(&normal));

    let header = package_header(
        &package.import_path,
        &config.display_name(),
        tagged.iter().map(|(_, syntax)| syntax),
    );
    compile_fragments(results, &header, &scope, dialect.as_ref(), driver.as_ref())
}

/// Run `results` in the given order on top of `header`.
pub(crate) fn compile_fragments(
    results: Vec<CompileResult>,
    header: &str,
    scope: &Arc<Scope>,
    dialect: &dyn Dialect,
    driver: &dyn Driver,
) -> Result<String, CompileError> {
    let mut buffer = format(header).map_err(|e| CompileError::Header(e.into()))?;
    let mut eval = EvalContext::load(Arc::clone(scope), &buffer).map_err(CompileError::Header)?;

    for result in results {
        let location = result.location.clone();
        let env = GenerationEnv {
            eval: &eval,
            dialect,
            driver,
        };
        let fragment = match result.generate(&env) {
            Ok(fragment) => fragment,
            Err(source) => return Err(CompileError::Fragment { location, source }),
        };

        let candidate = format!("{buffer}\n{fragment}\n");
        let formatted = match format(&candidate) {
            Ok(formatted) => formatted,
            Err(source) => {
                return Err(CompileError::Format {
                    location,
                    fragment,
                    source,
                })
            }
        };
        eval = match EvalContext::load(Arc::clone(scope), &formatted) {
            Ok(eval) => eval,
            Err(source) => {
                return Err(CompileError::Evaluation {
                    location,
                    fragment,
                    source,
                })
            }
        };
        tracing::trace!(%location, "fragment accepted");
        buffer = formatted;
    }

    Ok(buffer)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

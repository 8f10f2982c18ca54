//! Level scheduler.
//!
//! Levels run strictly in order. The nodes of one level are compiled on a
//! scoped rayon pool and joined before anything is written; the coordinator
//! then applies each result to the run state and writes the successful
//! outputs before the next level starts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use qlgen_compile::{autocompile_package, EvaluationConfig};
use qlgen_context::{GeneratorContext, CONFIG_DIR};
use qlgen_package::{BuildContext, PackageSources};
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::emit::write_output;
use crate::errors::{GraphError, NodeError};
use crate::graph::{DependencyGraph, NodeId, PackageNode};
use crate::level::Level;

/// Generated text by package import path, for every package written.
pub type Outputs = BTreeMap<String, String>;

/// What to do with a package whose dependency failed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// Compile it anyway against whatever the dependency left on disk, and
    /// log a warning.
    #[default]
    Warn,
    /// Do not compile it; it fails with [`NodeError::UpstreamFailed`].
    Skip,
}

/// Shared cancellation signal. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Directory holding the named configurations.
    pub config_dir: PathBuf,
    /// Compile the nodes of a level concurrently.
    pub parallel: bool,
    /// Worker threads (0 = rayon's default).
    pub threads: usize,
    pub upstream: UpstreamFailure,
    pub cancel: CancelFlag,
}

impl Default for GraphOptions {
    fn default() -> Self {
        GraphOptions {
            config_dir: PathBuf::from(CONFIG_DIR),
            parallel: true,
            threads: 0,
            upstream: UpstreamFailure::default(),
            cancel: CancelFlag::new(),
        }
    }
}

impl GraphOptions {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        GraphOptions {
            config_dir: config_dir.into(),
            ..Self::default()
        }
    }
}

/// Where a node stands during one run.
#[derive(Debug)]
pub enum NodeState {
    Pending,
    Succeeded,
    Failed(NodeError),
    Skipped { dependency: String },
    Cancelled,
}

impl NodeState {
    pub fn is_failure(&self) -> bool {
        matches!(self, NodeState::Failed(_) | NodeState::Skipped { .. })
    }
}

/// Generate every package reachable from `candidates` that carries
/// directive files, writing each output to `output_file` in its package
/// directory.
///
/// Discovery errors and cycles stop the run before anything is compiled.
/// Otherwise every level runs; failures are collected and the first one, in
/// import path order, is returned along with everything written.
#[tracing::instrument(level = "debug", skip_all, fields(config = config_name))]
pub fn autocompile_graph(
    config_name: &str,
    build: &BuildContext,
    output_file: &Path,
    candidates: &[String],
    options: &GraphOptions,
) -> Result<Outputs, GraphError> {
    let graph = DependencyGraph::discover(build, candidates).map_err(GraphError::Discover)?;
    let levels = graph.levelize()?;
    run_levels(&graph, &levels, output_file, options, |node| {
        compile_node(config_name, &options.config_dir, node)
    })
}

/// Compile one package with a fresh generator context.
fn compile_node(
    config_name: &str,
    config_dir: &Path,
    node: &PackageNode,
) -> Result<String, NodeError> {
    let ctx = GeneratorContext::load(config_dir, config_name).map_err(|source| {
        NodeError::Context {
            config: config_name.to_string(),
            source,
        }
    })?;
    let sources = PackageSources::load(&node.package, &node.tagged)?;
    let output = autocompile_package(
        &EvaluationConfig::from_context(&ctx),
        Arc::clone(ctx.dialect()),
        Arc::clone(ctx.driver()),
        &sources,
        &node.package,
    )?;
    Ok(output)
}

/// Run `levels` of `graph`, compiling each node with `compile`.
pub fn run_levels<F>(
    graph: &DependencyGraph,
    levels: &[Level],
    output_file: &Path,
    options: &GraphOptions,
    compile: F,
) -> Result<Outputs, GraphError>
where
    F: Fn(&PackageNode) -> Result<String, NodeError> + Sync,
{
    let mut run = Run {
        graph,
        levels,
        output_file,
        options,
        compile: &compile,
        states: (0..graph.len()).map(|_| NodeState::Pending).collect(),
        outputs: Outputs::new(),
    };

    if !options.parallel {
        return run.execute(None);
    }

    // build_scoped joins the workers before returning.
    let result = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .thread_name(|i| format!("qlgen-worker-{i}"))
        .build_scoped(rayon::ThreadBuilder::run, |pool| run.execute(Some(pool)));
    match result {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("failed to create thread pool ({e}), running sequentially");
            run.execute(None)
        }
    }
}

struct Run<'a, F> {
    graph: &'a DependencyGraph,
    levels: &'a [Level],
    output_file: &'a Path,
    options: &'a GraphOptions,
    compile: &'a F,
    states: Vec<NodeState>,
    outputs: Outputs,
}

impl<'a, F> Run<'a, F>
where
    F: Fn(&PackageNode) -> Result<String, NodeError> + Sync,
{
    fn execute(&mut self, pool: Option<&ThreadPool>) -> Result<Outputs, GraphError> {
        let levels = self.levels;
        for (index, level) in levels.iter().enumerate() {
            if self.options.cancel.is_cancelled() {
                tracing::debug!(level = index, "cancelled before level");
                return Err(GraphError::Cancelled {
                    outputs: std::mem::take(&mut self.outputs),
                });
            }
            tracing::debug!(level = index, nodes = level.len(), "starting level");

            let dispatch = self.dispatchable(level);
            let results = self.compile_level(pool, &dispatch);
            for (id, result) in results {
                self.apply(id, result);
            }
        }

        if self
            .states
            .iter()
            .any(|state| matches!(state, NodeState::Cancelled))
        {
            return Err(GraphError::Cancelled {
                outputs: std::mem::take(&mut self.outputs),
            });
        }
        self.finish()
    }

    /// Nodes of `level` to compile, after applying the upstream failure
    /// policy.
    fn dispatchable(&mut self, level: &Level) -> Vec<NodeId> {
        let graph = self.graph;
        let mut dispatch = Vec::with_capacity(level.len());
        for &id in level.nodes() {
            let import_path = &graph.node(id).import_path;
            match self.failed_dependency(id) {
                Some(dependency) if self.options.upstream == UpstreamFailure::Skip => {
                    tracing::debug!(package = %import_path, dependency, "skipping package");
                    self.states[id.index()] = NodeState::Skipped {
                        dependency: dependency.to_string(),
                    };
                    continue;
                }
                Some(dependency) => {
                    tracing::warn!(
                        package = %import_path,
                        dependency,
                        "compiling against a failed dependency; output may be stale"
                    );
                }
                None => {}
            }
            dispatch.push(id);
        }
        dispatch
    }

    fn failed_dependency(&self, id: NodeId) -> Option<&'a str> {
        let graph = self.graph;
        graph
            .node_deps(id)
            .find(|dep| self.states[dep.index()].is_failure())
            .map(|dep| graph.node(dep).import_path.as_str())
    }

    /// Compile `ids` concurrently. `None` marks a node not started because
    /// the run was cancelled.
    fn compile_level(
        &self,
        pool: Option<&ThreadPool>,
        ids: &[NodeId],
    ) -> Vec<(NodeId, Option<Result<String, NodeError>>)> {
        let graph = self.graph;
        let compile = self.compile;
        let cancel = &self.options.cancel;
        let task = |&id: &NodeId| {
            if cancel.is_cancelled() {
                return (id, None);
            }
            let node = graph.node(id);
            tracing::debug!(package = %node.import_path, "compiling package");
            (id, Some(compile(node)))
        };

        match pool {
            Some(pool) => pool.install(|| ids.par_iter().map(task).collect()),
            None => ids.iter().map(task).collect(),
        }
    }

    fn apply(&mut self, id: NodeId, result: Option<Result<String, NodeError>>) {
        let graph = self.graph;
        let node = graph.node(id);
        let result = match result {
            None => {
                self.states[id.index()] = NodeState::Cancelled;
                return;
            }
            Some(result) => result.and_then(|text| {
                write_output(&node.package.dir, self.output_file, &text)?;
                Ok(text)
            }),
        };
        self.states[id.index()] = match result {
            Ok(text) => {
                self.outputs.insert(node.import_path.clone(), text);
                NodeState::Succeeded
            }
            Err(err) => {
                tracing::warn!(package = %node.import_path, error = %err, "package failed");
                NodeState::Failed(err)
            }
        };
    }

    fn finish(&mut self) -> Result<Outputs, GraphError> {
        let graph = self.graph;
        let mut failures: Vec<(&str, NodeError)> = std::mem::take(&mut self.states)
            .into_iter()
            .zip(graph.ids())
            .filter_map(|(state, id)| {
                let error = match state {
                    NodeState::Failed(err) => err,
                    NodeState::Skipped { dependency } => NodeError::UpstreamFailed { dependency },
                    NodeState::Pending | NodeState::Succeeded | NodeState::Cancelled => {
                        return None
                    }
                };
                Some((graph.node(id).import_path.as_str(), error))
            })
            .collect();
        let outputs = std::mem::take(&mut self.outputs);
        if failures.is_empty() {
            return Ok(outputs);
        }

        failures.sort_by(|a, b| a.0.cmp(b.0));
        let count = failures.len();
        let (import_path, source) = failures.swap_remove(0);
        Err(GraphError::Compile {
            import_path: import_path.to_string(),
            source,
            failures: count,
            outputs,
        })
    }
}

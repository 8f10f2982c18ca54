//! Package dependency graph.
//!
//! Nodes live in an arena addressed by [`NodeId`]. The graph is built once by
//! [`DependencyGraph::discover`] and not changed afterwards; leveling and
//! scheduling keep their own state.

use std::collections::BTreeSet;

use qlgen_package::{tagged_files, BuildContext, Package, PackageError, GENERATE_FLAG};
use rustc_hash::{FxHashMap, FxHashSet};

/// Index of a node in its graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A package with directive files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageNode {
    pub import_path: String,
    /// The package under normal build flags.
    pub package: Package,
    /// Files present only under the generation flag.
    pub tagged: BTreeSet<String>,
    /// Imports of the package (tagged files included) inside the module.
    /// Not all of them are nodes.
    pub deps: BTreeSet<String>,
}

#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    module_path: String,
    nodes: Vec<PackageNode>,
    index: FxHashMap<String, NodeId>,
    visited: FxHashSet<String>,
    processing: FxHashSet<String>,
}

impl DependencyGraph {
    /// Build the graph reachable from `candidates`.
    ///
    /// Each package is loaded with and without [`GENERATE_FLAG`]; the files
    /// that only appear with it are its tagged files. Packages without
    /// tagged files are not nodes and their imports are not followed.
    pub fn discover(build: &BuildContext, candidates: &[String]) -> Result<Self, PackageError> {
        let generate = build.with_flag(GENERATE_FLAG);
        let mut graph = DependencyGraph {
            module_path: build.module_path().to_string(),
            ..DependencyGraph::default()
        };
        for candidate in candidates {
            graph.visit(build, &generate, candidate)?;
        }
        tracing::debug!(
            candidates = candidates.len(),
            nodes = graph.nodes.len(),
            "discovered dependency graph"
        );
        Ok(graph)
    }

    fn visit(
        &mut self,
        build: &BuildContext,
        generate: &BuildContext,
        import_path: &str,
    ) -> Result<(), PackageError> {
        if self.visited.contains(import_path) || self.processing.contains(import_path) {
            return Ok(());
        }
        self.processing.insert(import_path.to_string());

        let normal = build.import(import_path)?;
        let tagged_package = generate.import(import_path)?;
        let tagged = tagged_files(&normal, &tagged_package);

        if !tagged.is_empty() {
            let deps: BTreeSet<String> = tagged_package
                .imports
                .into_iter()
                .filter(|dep| build.in_module(dep))
                .collect();
            for dep in &deps {
                self.visit(build, generate, dep)?;
            }
            tracing::trace!(import_path, tagged = tagged.len(), deps = deps.len(), "added node");
            self.push(PackageNode {
                import_path: import_path.to_string(),
                package: normal,
                tagged,
                deps,
            });
        }

        self.processing.remove(import_path);
        self.visited.insert(import_path.to_string());
        Ok(())
    }

    /// Add a node. Used by discovery and by callers assembling a graph by
    /// hand.
    pub fn push(&mut self, node: PackageNode) -> NodeId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "package counts are far below u32::MAX"
        )]
        let id = NodeId(self.nodes.len() as u32);
        self.index.insert(node.import_path.clone(), id);
        self.nodes.push(node);
        id
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &PackageNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, import_path: &str) -> Option<NodeId> {
        self.index.get(import_path).copied()
    }

    /// Whether `import_path` was loaded during discovery, node or not.
    pub fn is_visited(&self, import_path: &str) -> bool {
        self.visited.contains(import_path)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "ids are created from u32 lengths"
    )]
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Dependencies of `id` that are themselves nodes.
    pub fn node_deps(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).deps.iter().filter_map(|dep| self.get(dep))
    }
}

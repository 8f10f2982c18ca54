//! qlgen Dependency Graph
//!
//! Finds the packages of a module that carry directive files, orders them by
//! their imports and generates them level by level.
//!
//! # Architecture
//!
//! ```text
//! candidates ──► discover ──► DependencyGraph (arena, immutable)
//!                                    │
//!                                levelize (Kahn, batched)
//!                                    │
//!        ┌──────── for each level, in order ────────┐
//!        │ rayon pool: autocompile_package per node │
//!        │ join ► write outputs of successful nodes │
//!        └──────────────────────────────────────────┘
//!                                    │
//!                         Outputs or GraphError
//! ```
//!
//! A failed node never stops its siblings or later levels. What happens to
//! the dependents of a failed node is chosen with [`UpstreamFailure`].

mod emit;
mod errors;
mod graph;
mod level;
mod schedule;

pub use emit::write_output;
pub use errors::{CycleError, GraphError, NodeError};
pub use graph::{DependencyGraph, NodeId, PackageNode};
pub use level::Level;
pub use schedule::{
    autocompile_graph, run_levels, CancelFlag, GraphOptions, NodeState, Outputs, UpstreamFailure,
};

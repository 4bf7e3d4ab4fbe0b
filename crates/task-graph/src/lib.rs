//! Cycle-aware task graph analysis for dagsched.
//!
//! A task graph may contain dependency cycles. This crate finds them,
//! collapses each strongly connected component into a single node, orders the
//! resulting DAG and computes shortest and critical (longest) paths weighted by
//! task durations.
//!
//! # Key Types
//!
//! - [`TaskGraph`]: tasks keyed by identifier, backed by petgraph
//! - [`TaskNodeData`]: trait that task types implement to be stored in the graph
//! - [`SccResult`] / [`Component`]: output of [`find_components`]
//! - [`CondensationGraph`]: the component DAG with per-component weights
//! - [`PathAnalyzer`]: shortest paths and the critical path
//! - [`Metrics`]: counters and timing handed to every stage
//!
//! # Example
//!
//! ```
//! use dagsched_task_graph::{analyze, Task, TaskGraph};
//!
//! let graph = TaskGraph::from_tasks([
//!     ("build", Task::new("build", "Build", 5)),
//!     ("test", Task::new("test", "Test", 3).with_dependencies(["build"])),
//! ])?;
//!
//! let analysis = analyze(&graph)?;
//! assert_eq!(analysis.task_order, vec!["build", "test"]);
//! assert_eq!(analysis.critical_path.length, Some(8));
//! # Ok::<(), dagsched_task_graph::Error>(())
//! ```

mod condensation;
mod error;
mod graph;
pub mod metrics;
mod paths;
mod pipeline;
mod scc;
mod task;
mod topo;

pub use condensation::CondensationGraph;
pub use error::{Error, Result};
pub use graph::{GraphNode, TaskGraph};
pub use metrics::{Metrics, MetricsSnapshot};
pub use paths::{PathAnalyzer, PathResult, ShortestPaths};
pub use pipeline::{Analysis, Stage, analyze};
pub use scc::{Component, ComponentId, SccFinder, SccResult, find_components};
pub use task::Task;
pub use topo::{dependency_levels, expand_to_tasks, sort_components, sort_tasks};

/// Trait for task data that can be stored in the task graph.
///
/// Implement this trait for your task type to enable it to be stored
/// in a [`TaskGraph`] and take part in the analysis.
pub trait TaskNodeData: Clone {
    /// Returns the identifiers of tasks this task depends on.
    fn dependency_names(&self) -> impl Iterator<Item = &str>;

    /// Returns the task's duration. Durations are the path weights.
    fn duration(&self) -> u64;

    /// Returns the identifier the task carries, if it carries one.
    ///
    /// When present it must equal the key the task is registered under.
    fn task_id(&self) -> Option<&str> {
        None
    }
}

//! The full analysis run: SCCs, condensation, ordering, critical path.

use crate::condensation::CondensationGraph;
use crate::error::Result;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::paths::{PathAnalyzer, PathResult};
use crate::scc::{ComponentId, SccResult, find_components};
use crate::topo::{dependency_levels, expand_to_tasks, sort_components};
use crate::{TaskGraph, TaskNodeData};
use std::fmt;
use tracing::info;

/// A stage of the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Strongly connected component detection.
    Scc,
    /// Condensation into a component DAG.
    Condensation,
    /// Topological sort of the condensation.
    TopologicalSort,
    /// Longest-path computation.
    CriticalPath,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scc => "scc",
            Self::Condensation => "condensation",
            Self::TopologicalSort => "topological_sort",
            Self::CriticalPath => "critical_path",
        })
    }
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Components and the task-to-component map.
    pub scc: SccResult,
    /// The component DAG with weights.
    pub condensation: CondensationGraph,
    /// Component ids in topological order.
    pub component_order: Vec<ComponentId>,
    /// Tasks flattened from `component_order`.
    pub task_order: Vec<String>,
    /// Components grouped by dependency depth.
    pub levels: Vec<Vec<ComponentId>>,
    /// The heaviest path through the condensation.
    pub critical_path: PathResult,
    /// Metrics of each stage, in execution order.
    pub stage_metrics: Vec<(Stage, MetricsSnapshot)>,
}

impl Analysis {
    /// A path analyzer reusing this run's topological order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`](crate::Error::InvalidOrder) if
    /// `component_order` no longer sorts `condensation`.
    pub fn path_analyzer(&self) -> Result<PathAnalyzer<'_>> {
        PathAnalyzer::with_order(&self.condensation, self.component_order.clone())
    }

    /// Metrics recorded for `stage`.
    #[must_use]
    pub fn metrics_for(&self, stage: Stage) -> Option<&MetricsSnapshot> {
        self.stage_metrics
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, snapshot)| snapshot)
    }
}

/// Run all four stages over `graph`.
///
/// Each stage gets a freshly reset [`Metrics`] handle and its snapshot is
/// kept in [`Analysis::stage_metrics`].
///
/// # Errors
///
/// Only internal-consistency failures surface here:
/// [`Error::UnknownTask`](crate::Error::UnknownTask) from condensation or
/// [`Error::CondensationCycle`](crate::Error::CondensationCycle) from the
/// sort. Malformed input is rejected earlier, when the graph is built.
pub fn analyze<T: TaskNodeData>(graph: &TaskGraph<T>) -> Result<Analysis> {
    let mut metrics = Metrics::new();
    let mut stage_metrics = Vec::with_capacity(4);

    let scc = find_components(graph, &mut metrics);
    stage_metrics.push((Stage::Scc, metrics.snapshot()));

    let condensation = CondensationGraph::build(graph, &scc, &mut metrics)?;
    stage_metrics.push((Stage::Condensation, metrics.snapshot()));

    let component_order = sort_components(&condensation, &mut metrics)?;
    stage_metrics.push((Stage::TopologicalSort, metrics.snapshot()));

    let task_order = expand_to_tasks(&condensation, &component_order);
    let levels = dependency_levels(&condensation, &component_order);

    let critical_path = PathAnalyzer::with_order(&condensation, component_order.clone())?
        .longest_path(&mut metrics);
    stage_metrics.push((Stage::CriticalPath, metrics.snapshot()));

    info!(
        tasks = graph.task_count(),
        edges = graph.edge_count(),
        components = scc.len(),
        cyclic_components = scc.cyclic_components(graph).count(),
        condensation_edges = condensation.edge_count(),
        critical_length = ?critical_path.length,
        "Task graph analysis complete"
    );

    Ok(Analysis {
        scc,
        condensation,
        component_order,
        task_order,
        levels,
        critical_path,
        stage_metrics,
    })
}

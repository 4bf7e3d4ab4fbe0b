//! Condensation of a task graph into a DAG of components.

use crate::error::{Error, Result};
use crate::metrics::{Metrics, counters};
use crate::scc::{Component, ComponentId, SccResult};
use crate::{TaskGraph, TaskNodeData};
use std::collections::HashSet;
use tracing::debug;

/// Acyclic graph whose vertices are strongly connected components.
///
/// Component ids index directly into [`components`](Self::components),
/// [`successors`](Self::successors) and [`weight`](Self::weight).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondensationGraph {
    components: Vec<Component>,
    adjacency: Vec<Vec<ComponentId>>,
    weights: Vec<u64>,
}

impl CondensationGraph {
    /// Collapse `graph` along the components found by SCC detection.
    ///
    /// Cross-component edges are recorded once per ordered pair, in the order
    /// they are first met while walking tasks and their dependents in
    /// insertion order. Edges inside a component are dropped. A component's
    /// weight is the largest duration among its members.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] if a task of `graph` is missing from
    /// the task-to-component map, which means `scc` was computed for a
    /// different graph.
    pub fn build<T: TaskNodeData>(
        graph: &TaskGraph<T>,
        scc: &SccResult,
        metrics: &mut Metrics,
    ) -> Result<Self> {
        metrics.reset();
        metrics.start_timer();

        let count = scc.components.len();
        let mut adjacency: Vec<Vec<ComponentId>> = vec![Vec::new(); count];
        let mut seen: HashSet<(ComponentId, ComponentId)> = HashSet::new();

        for (index, node) in graph.iter_nodes() {
            let from = lookup(scc, &node.name, count)?;

            for dependent in graph.dependents(index) {
                metrics.increment(counters::EDGES_SCANNED);
                let name = graph
                    .node(dependent)
                    .map(|n| n.name.as_str())
                    .unwrap_or_default();
                let to = lookup(scc, name, count)?;

                if from == to {
                    metrics.increment(counters::EDGES_INTERNAL);
                } else if seen.insert((from, to)) {
                    adjacency[from].push(to);
                    metrics.increment(counters::EDGES_ADDED);
                }
            }
        }

        let mut weights = Vec::with_capacity(count);
        for component in &scc.components {
            let mut weight = 0;
            for task_id in &component.task_ids {
                let node = graph
                    .get_node_by_name(task_id)
                    .ok_or_else(|| Error::UnknownTask {
                        id: task_id.clone(),
                    })?;
                weight = weight.max(node.task.duration());
            }
            weights.push(weight);
        }

        metrics.stop_timer();
        debug!(
            components = count,
            edges = seen.len(),
            elapsed_us = metrics.elapsed().as_micros(),
            "Condensation built"
        );

        Ok(Self {
            components: scc.components.clone(),
            adjacency,
            weights,
        })
    }

    /// Assemble a condensation from parts, bypassing SCC detection.
    ///
    /// Weights default to zero for components without an entry. Successor
    /// ids outside the component range and repeated successors are dropped.
    /// Nothing here checks that the adjacency is acyclic, which is what
    /// [`sort_components`](crate::topo::sort_components) verifies.
    #[must_use]
    pub fn from_parts(
        components: Vec<Component>,
        adjacency: Vec<Vec<ComponentId>>,
        weights: Vec<u64>,
    ) -> Self {
        let count = components.len();
        let mut adjacency: Vec<Vec<ComponentId>> = adjacency
            .into_iter()
            .take(count)
            .map(|successors| {
                let mut seen = HashSet::new();
                successors
                    .into_iter()
                    .filter(|&id| id < count && seen.insert(id))
                    .collect()
            })
            .collect();
        adjacency.resize(count, Vec::new());
        let mut weights = weights;
        weights.resize(count, 0);
        Self {
            components,
            adjacency,
            weights,
        }
    }

    /// Components in id order.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Component by id.
    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// Distinct successors of `id`; empty for unknown ids.
    #[must_use]
    pub fn successors(&self, id: ComponentId) -> &[ComponentId] {
        self.adjacency.get(id).map_or(&[], Vec::as_slice)
    }

    /// Full adjacency, indexed by component id.
    #[must_use]
    pub fn adjacency(&self) -> &[Vec<ComponentId>] {
        &self.adjacency
    }

    /// Weight of `id`: the maximum member duration, zero for unknown ids.
    #[must_use]
    pub fn weight(&self, id: ComponentId) -> u64 {
        self.weights.get(id).copied().unwrap_or(0)
    }

    /// All weights, indexed by component id.
    #[must_use]
    pub fn weights(&self) -> &[u64] {
        &self.weights
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the condensation has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of distinct component edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Whether `id` names a component of this graph.
    #[must_use]
    pub fn contains(&self, id: ComponentId) -> bool {
        id < self.components.len()
    }
}

fn lookup(scc: &SccResult, task_id: &str, count: usize) -> Result<ComponentId> {
    match scc.component_of(task_id) {
        Some(id) if id < count => Ok(id),
        _ => Err(Error::UnknownTask {
            id: task_id.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Task;
    use crate::scc::find_components;
    use std::collections::HashMap;

    fn build(tasks: &[(&str, u64, &[&str])]) -> TaskGraph<Task> {
        TaskGraph::from_tasks(tasks.iter().map(|(id, duration, deps)| {
            (
                (*id).to_string(),
                Task::new(*id, format!("Task {id}"), *duration)
                    .with_dependencies(deps.iter().copied()),
            )
        }))
        .unwrap()
    }

    fn condense(graph: &TaskGraph<Task>) -> (SccResult, CondensationGraph) {
        let scc = find_components(graph, &mut Metrics::new());
        let dag = CondensationGraph::build(graph, &scc, &mut Metrics::new()).unwrap();
        (scc, dag)
    }

    #[test]
    fn test_chain_keeps_every_edge() {
        let graph = build(&[
            ("T1", 5, &[]),
            ("T2", 3, &["T1"]),
            ("T3", 4, &["T2"]),
            ("T4", 2, &["T3"]),
        ]);
        let (scc, dag) = condense(&graph);

        assert_eq!(dag.len(), 4);
        assert_eq!(dag.edge_count(), 3);
        let c1 = scc.component_of("T1").unwrap();
        let c2 = scc.component_of("T2").unwrap();
        assert_eq!(dag.successors(c1), &[c2]);
        assert_eq!(dag.weight(c1), 5);
        assert_eq!(dag.weight(c2), 3);
    }

    #[test]
    fn test_single_cycle_collapses_to_one_node() {
        let graph = build(&[("T1", 5, &["T3"]), ("T2", 3, &["T1"]), ("T3", 4, &["T2"])]);
        let (_, dag) = condense(&graph);

        assert_eq!(dag.len(), 1);
        assert_eq!(dag.edge_count(), 0);
        assert!(dag.successors(0).is_empty());
        assert_eq!(dag.weight(0), 5);
    }

    #[test]
    fn test_parallel_edges_are_deduplicated() {
        // two members of one cycle both feed T4
        let graph = build(&[
            ("T1", 1, &["T2"]),
            ("T2", 7, &["T1"]),
            ("T3", 2, &[]),
            ("T4", 3, &["T1", "T2", "T3", "T1"]),
        ]);
        let (scc, dag) = condense(&graph);

        let cycle = scc.component_of("T1").unwrap();
        let sink = scc.component_of("T4").unwrap();
        assert_eq!(dag.successors(cycle), &[sink]);
        assert_eq!(dag.edge_count(), 2);
        assert_eq!(dag.weight(cycle), 7);
    }

    #[test]
    fn test_self_loop_dropped() {
        let graph = build(&[("T1", 5, &["T1"]), ("T2", 1, &["T1"])]);
        let mut metrics = Metrics::new();
        let scc = find_components(&graph, &mut Metrics::new());
        let dag = CondensationGraph::build(&graph, &scc, &mut metrics).unwrap();

        let c1 = scc.component_of("T1").unwrap();
        assert!(!dag.successors(c1).contains(&c1));
        assert_eq!(metrics.counter(counters::EDGES_INTERNAL), 1);
        assert_eq!(metrics.counter(counters::EDGES_ADDED), 1);
        assert_eq!(metrics.counter(counters::EDGES_SCANNED), 2);
    }

    #[test]
    fn test_independent_cycles_have_no_edges() {
        let graph = build(&[
            ("T1", 5, &["T2"]),
            ("T2", 3, &["T1"]),
            ("T3", 4, &["T4"]),
            ("T4", 2, &["T3"]),
        ]);
        let (_, dag) = condense(&graph);

        assert_eq!(dag.len(), 2);
        assert_eq!(dag.edge_count(), 0);
        assert_eq!(dag.weights(), &[5, 4]);
    }

    #[test]
    fn test_unmapped_task_fails_loudly() {
        let graph = build(&[("T1", 5, &[]), ("T2", 3, &["T1"])]);
        let mut scc = find_components(&graph, &mut Metrics::new());
        scc.task_to_component.remove("T2");

        let err = CondensationGraph::build(&graph, &scc, &mut Metrics::new()).unwrap_err();
        assert_eq!(err, Error::UnknownTask { id: "T2".into() });
    }

    #[test]
    fn test_empty_graph() {
        let graph: TaskGraph<Task> = TaskGraph::new();
        let (_, dag) = condense(&graph);

        assert!(dag.is_empty());
        assert_eq!(dag.edge_count(), 0);
    }

    #[test]
    fn test_from_parts_pads_missing_entries() {
        let components = vec![
            Component {
                id: 0,
                task_ids: vec!["a".into()],
            },
            Component {
                id: 1,
                task_ids: vec!["b".into()],
            },
        ];
        let dag = CondensationGraph::from_parts(components, vec![vec![1, 9, 1]], vec![4]);

        assert_eq!(dag.successors(0), &[1]);
        assert_eq!(dag.successors(1), &[] as &[ComponentId]);
        assert_eq!(dag.weight(1), 0);
        assert_eq!(dag.weight(0), 4);
        assert!(dag.contains(1));
        assert!(!dag.contains(2));
    }

    #[test]
    fn test_mapping_is_consistent_with_edges() {
        let graph = build(&[
            ("a", 1, &[]),
            ("b", 2, &["a", "d"]),
            ("c", 3, &["b"]),
            ("d", 4, &["c"]),
            ("e", 5, &["d", "a"]),
        ]);
        let (scc, dag) = condense(&graph);

        let mut expected: HashMap<ComponentId, HashSet<ComponentId>> = HashMap::new();
        for (from, to) in graph.edges() {
            let (cf, ct) = (
                scc.component_of(from).unwrap(),
                scc.component_of(to).unwrap(),
            );
            if cf != ct {
                expected.entry(cf).or_default().insert(ct);
            }
        }
        for component in dag.components() {
            let actual: HashSet<_> = dag.successors(component.id).iter().copied().collect();
            assert_eq!(actual, expected.remove(&component.id).unwrap_or_default());
        }
    }
}

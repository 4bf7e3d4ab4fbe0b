//! Strongly connected component detection (Tarjan's algorithm).
//!
//! The depth-first search runs on an explicit frame stack, so arbitrarily
//! long dependency chains cannot exhaust the call stack. Visit order and the
//! discovery/low-link update rules are the same as the textbook recursive
//! formulation: roots are tried in task insertion order and neighbors in
//! edge insertion order.

use crate::metrics::{Metrics, counters};
use crate::{TaskGraph, TaskNodeData};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Identifier of a component, assigned in closure order starting at zero.
pub type ComponentId = usize;

/// A strongly connected component of the task graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Closure-order identifier.
    pub id: ComponentId,
    /// Member task identifiers in the order they left the Tarjan stack.
    pub task_ids: Vec<String>,
}

impl Component {
    /// Number of member tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.task_ids.len()
    }

    /// Whether the component has no members. Never true for components
    /// produced by [`find_components`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }

    /// Whether `task_id` is a member.
    #[must_use]
    pub fn contains(&self, task_id: &str) -> bool {
        self.task_ids.iter().any(|id| id == task_id)
    }

    /// Whether the component is an actual cycle: more than one member, or a
    /// single member that depends on itself.
    #[must_use]
    pub fn is_cyclic<T: TaskNodeData>(&self, graph: &TaskGraph<T>) -> bool {
        match self.task_ids.as_slice() {
            [single] => graph
                .dependents_of(single)
                .is_some_and(|deps| deps.contains(&single.as_str())),
            members => members.len() > 1,
        }
    }
}

/// Output of SCC detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SccResult {
    /// Components in closure order; `components[i].id == i`.
    pub components: Vec<Component>,
    /// Task identifier to owning component.
    pub task_to_component: HashMap<String, ComponentId>,
}

impl SccResult {
    /// Component owning `task_id`.
    #[must_use]
    pub fn component_of(&self, task_id: &str) -> Option<ComponentId> {
        self.task_to_component.get(task_id).copied()
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no components were found (empty graph).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components that are real cycles, see [`Component::is_cyclic`].
    pub fn cyclic_components<'a, T: TaskNodeData>(
        &'a self,
        graph: &'a TaskGraph<T>,
    ) -> impl Iterator<Item = &'a Component> {
        self.components.iter().filter(|c| c.is_cyclic(graph))
    }
}

/// Find the strongly connected components of `graph`.
///
/// Resets `metrics` on entry and records `dfs_calls`, `vertices_visited`,
/// `edges_explored` and `stack_operations`.
pub fn find_components<T: TaskNodeData>(graph: &TaskGraph<T>, metrics: &mut Metrics) -> SccResult {
    SccFinder::new(graph, metrics).run()
}

/// One suspended DFS call: the vertex and how far through its neighbors we are.
struct Frame {
    node: NodeIndex,
    neighbors: Vec<NodeIndex>,
    cursor: usize,
}

/// Working state of one Tarjan run.
pub struct SccFinder<'a, T: TaskNodeData> {
    graph: &'a TaskGraph<T>,
    metrics: &'a mut Metrics,
    discovery: Vec<Option<usize>>,
    low_link: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<NodeIndex>,
    next_index: usize,
    components: Vec<Component>,
    task_to_component: HashMap<String, ComponentId>,
}

impl<'a, T: TaskNodeData> SccFinder<'a, T> {
    /// Prepare a run over `graph`, resetting `metrics`.
    pub fn new(graph: &'a TaskGraph<T>, metrics: &'a mut Metrics) -> Self {
        metrics.reset();
        let n = graph.task_count();
        Self {
            graph,
            metrics,
            discovery: vec![None; n],
            low_link: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            next_index: 0,
            components: Vec::new(),
            task_to_component: HashMap::with_capacity(n),
        }
    }

    /// Run the search over every task and return the components.
    pub fn run(mut self) -> SccResult {
        self.metrics.start_timer();

        let roots: Vec<NodeIndex> = self.graph.iter_nodes().map(|(idx, _)| idx).collect();
        for root in roots {
            if self.discovery[root.index()].is_none() {
                self.strong_connect(root);
            }
        }

        self.metrics.stop_timer();
        debug!(
            tasks = self.graph.task_count(),
            components = self.components.len(),
            edges_explored = self.metrics.counter(counters::EDGES_EXPLORED),
            elapsed_us = self.metrics.elapsed().as_micros(),
            "SCC detection finished"
        );

        SccResult {
            components: self.components,
            task_to_component: self.task_to_component,
        }
    }

    fn strong_connect(&mut self, start: NodeIndex) {
        let mut call_stack = vec![self.enter(start)];

        while let Some(frame) = call_stack.last_mut() {
            let node = frame.node;

            if let Some(&next) = frame.neighbors.get(frame.cursor) {
                frame.cursor += 1;
                self.metrics.increment(counters::EDGES_EXPLORED);

                match self.discovery[next.index()] {
                    None => {
                        let child = self.enter(next);
                        call_stack.push(child);
                    }
                    Some(disc) if self.on_stack[next.index()] => {
                        // discovery index, not low-link, for vertices still on the stack
                        let low = &mut self.low_link[node.index()];
                        *low = (*low).min(disc);
                    }
                    Some(_) => {}
                }
                continue;
            }

            // all neighbors done: simulated return from `node`
            call_stack.pop();
            if Some(self.low_link[node.index()]) == self.discovery[node.index()] {
                self.close_component(node);
            }
            if let Some(parent) = call_stack.last() {
                let child_low = self.low_link[node.index()];
                let low = &mut self.low_link[parent.node.index()];
                *low = (*low).min(child_low);
            }
        }
    }

    fn enter(&mut self, node: NodeIndex) -> Frame {
        self.metrics.increment(counters::DFS_CALLS);
        self.metrics.increment(counters::VERTICES_VISITED);

        let i = node.index();
        self.discovery[i] = Some(self.next_index);
        self.low_link[i] = self.next_index;
        self.next_index += 1;

        self.stack.push(node);
        self.on_stack[i] = true;
        self.metrics.increment(counters::STACK_OPERATIONS);

        Frame {
            node,
            neighbors: self.graph.dependents(node),
            cursor: 0,
        }
    }

    fn close_component(&mut self, root: NodeIndex) {
        let id = self.components.len();
        let mut task_ids = Vec::new();

        while let Some(member) = self.stack.pop() {
            self.on_stack[member.index()] = false;
            self.metrics.increment(counters::STACK_OPERATIONS);

            if let Some(node) = self.graph.node(member) {
                self.task_to_component.insert(node.name.clone(), id);
                task_ids.push(node.name.clone());
            }
            if member == root {
                break;
            }
        }

        trace!(component = id, size = task_ids.len(), "Closed component");
        self.components.push(Component { id, task_ids });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Task;

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

    fn linear_chain(n: usize) -> TaskGraph<Task> {
        let mut graph = TaskGraph::new();
        for i in 1..=n {
            let id = format!("T{i}");
            let mut task = Task::new(&id, format!("Task {i}"), i as u64 + 1);
            if i > 1 {
                task.dependencies.push(format!("T{}", i - 1));
            }
            graph.add_task(&id, task).unwrap();
        }
        graph.add_dependency_edges().unwrap();
        graph
    }

    fn components(graph: &TaskGraph<Task>) -> SccResult {
        find_components(graph, &mut Metrics::new())
    }

    #[test]
    fn test_simple_dag_has_singleton_components() {
        let result = components(&linear_chain(4));

        assert_eq!(result.len(), 4);
        assert!(result.components.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_ids_follow_closure_order() {
        let result = components(&linear_chain(4));

        // the deepest task closes first
        assert_eq!(result.components[0].task_ids, vec!["T4"]);
        assert_eq!(result.components[3].task_ids, vec!["T1"]);
        for (i, component) in result.components.iter().enumerate() {
            assert_eq!(component.id, i);
        }
    }

    #[test]
    fn test_single_cycle() {
        let graph = build(&[("T1", 5, &["T3"]), ("T2", 3, &["T1"]), ("T3", 4, &["T2"])]);
        let result = components(&graph);

        assert_eq!(result.len(), 1);
        assert_eq!(result.components[0].len(), 3);
        // popped in reverse push order, root last
        assert_eq!(result.components[0].task_ids, vec!["T3", "T2", "T1"]);
        assert!(result.components[0].is_cyclic(&graph));
    }

    #[test]
    fn test_multiple_sccs() {
        let graph = build(&[
            ("T1", 5, &["T2"]),
            ("T2", 3, &["T1"]),
            ("T3", 4, &["T4"]),
            ("T4", 2, &["T3"]),
        ]);
        let result = components(&graph);

        assert_eq!(result.len(), 2);
        assert!(result.components.iter().all(|c| c.len() == 2));
        assert_eq!(result.component_of("T1"), result.component_of("T2"));
        assert_eq!(result.component_of("T3"), result.component_of("T4"));
        assert_ne!(result.component_of("T1"), result.component_of("T3"));
    }

    #[test]
    fn test_single_node() {
        let graph = build(&[("T1", 5, &[])]);
        let result = components(&graph);

        assert_eq!(result.len(), 1);
        assert_eq!(result.components[0].len(), 1);
        assert!(!result.components[0].is_cyclic(&graph));
    }

    #[test]
    fn test_self_loop() {
        let graph = build(&[("T1", 5, &["T1"])]);
        let result = components(&graph);

        assert_eq!(result.len(), 1);
        assert_eq!(result.components[0].task_ids, vec!["T1"]);
        assert!(result.components[0].is_cyclic(&graph));
        assert_eq!(result.cyclic_components(&graph).count(), 1);
    }

    #[test]
    fn test_empty_graph() {
        let graph: TaskGraph<Task> = TaskGraph::new();
        let result = components(&graph);

        assert!(result.is_empty());
        assert!(result.task_to_component.is_empty());
    }

    #[test]
    fn test_metrics_tracking() {
        let graph = linear_chain(5);
        let mut metrics = Metrics::new();
        find_components(&graph, &mut metrics);

        assert_eq!(metrics.counter(counters::DFS_CALLS), 5);
        assert_eq!(metrics.counter(counters::VERTICES_VISITED), 5);
        assert_eq!(metrics.counter(counters::EDGES_EXPLORED), 4);
        assert_eq!(metrics.counter(counters::STACK_OPERATIONS), 10);
    }

    #[test]
    fn test_metrics_reset_between_runs() {
        let graph = linear_chain(3);
        let mut metrics = Metrics::new();
        find_components(&graph, &mut metrics);
        find_components(&graph, &mut metrics);

        assert_eq!(metrics.counter(counters::DFS_CALLS), 3);
    }

    #[test]
    fn test_task_to_component_mapping() {
        let graph = build(&[("T1", 5, &["T2"]), ("T2", 3, &["T1"]), ("T3", 4, &["T1"])]);
        let result = components(&graph);

        assert_eq!(result.component_of("T1"), result.component_of("T2"));
        assert_ne!(result.component_of("T1"), result.component_of("T3"));
        assert_eq!(result.component_of("nope"), None);
    }

    #[test]
    fn test_cycle_with_tail_and_head() {
        // T1 -> (T2 -> T3 -> T4 -> T2) -> T5
        let graph = build(&[
            ("T1", 5, &[]),
            ("T2", 3, &["T1", "T4"]),
            ("T3", 4, &["T2"]),
            ("T4", 2, &["T3"]),
            ("T5", 6, &["T4"]),
        ]);
        let result = components(&graph);

        assert_eq!(result.len(), 3);
        let cycle = result.component_of("T2").unwrap();
        assert_eq!(result.components[cycle].len(), 3);
        assert_eq!(result.component_of("T3"), Some(cycle));
        assert_eq!(result.component_of("T4"), Some(cycle));
        assert_eq!(result.cyclic_components(&graph).count(), 1);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let graph = linear_chain(200_000);
        let result = components(&graph);
        assert_eq!(result.len(), 200_000);
    }
}

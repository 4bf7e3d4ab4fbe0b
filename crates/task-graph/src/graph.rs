//! Task graph storage using petgraph.
//!
//! Edges point from a prerequisite to the task that depends on it, so the
//! forward direction is "what can start once this finishes" and the reverse
//! direction is "what must finish first".

use crate::{Error, Result, TaskNodeData};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{EdgeRef, IntoNodeReferences};
use std::collections::HashMap;
use tracing::debug;

/// A node in the task graph.
#[derive(Debug, Clone)]
pub struct GraphNode<T> {
    /// Identifier of the task.
    pub name: String,
    /// The task data.
    pub task: T,
}

/// Directed task graph with forward and reverse adjacency.
///
/// Node indices follow task insertion order and neighbor lists follow edge
/// insertion order, which keeps every downstream algorithm deterministic for
/// a given input.
#[derive(Debug, Clone)]
pub struct TaskGraph<T: TaskNodeData> {
    /// The directed graph of tasks.
    graph: DiGraph<GraphNode<T>, ()>,
    /// Map from task identifiers to node indices.
    name_to_node: HashMap<String, NodeIndex>,
}

impl<T: TaskNodeData> TaskGraph<T> {
    /// Create a new empty task graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            name_to_node: HashMap::new(),
        }
    }

    /// Build a graph from `(id, task)` pairs and wire all dependency edges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTask`] if an identifier repeats,
    /// [`Error::TaskIdMismatch`] if a key disagrees with the task's own id, or
    /// [`Error::MissingDependencies`] if any dependency cannot be resolved.
    pub fn from_tasks<I, S>(tasks: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        let mut graph = Self::new();
        for (name, task) in tasks {
            graph.add_task(name.as_ref(), task)?;
        }
        graph.add_dependency_edges()?;
        Ok(graph)
    }

    /// Add a single task to the graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTask`] if a task with the same identifier
    /// already exists, or [`Error::TaskIdMismatch`] if the task carries an
    /// identifier other than `name`.
    pub fn add_task(&mut self, name: &str, task: T) -> Result<NodeIndex> {
        if let Some(id) = task.task_id().filter(|id| *id != name) {
            return Err(Error::TaskIdMismatch {
                key: name.to_string(),
                id: id.to_string(),
            });
        }
        if self.name_to_node.contains_key(name) {
            return Err(Error::DuplicateTask {
                id: name.to_string(),
            });
        }

        let node_index = self.graph.add_node(GraphNode {
            name: name.to_string(),
            task,
        });
        self.name_to_node.insert(name.to_string(), node_index);
        debug!("Added task node '{}'", name);

        Ok(node_index)
    }

    /// Wire dependency edges after all tasks have been added.
    ///
    /// Tasks are walked in insertion order and each task's dependencies in
    /// the order they are listed. Existing edges are replaced, so calling
    /// this again after adding more tasks rewires the whole graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDependencies`] if any task depends on a
    /// non-existent task. The graph's edges are left untouched in that case.
    pub fn add_dependency_edges(&mut self) -> Result<()> {
        let mut missing_deps = Vec::new();
        let mut edges_to_add = Vec::new();

        for (node_index, node) in self.graph.node_references() {
            for dep_name in node.task.dependency_names() {
                if let Some(&dep_node_index) = self.name_to_node.get(dep_name) {
                    edges_to_add.push((dep_node_index, node_index));
                } else {
                    missing_deps.push((node.name.clone(), dep_name.to_string()));
                }
            }
        }

        if !missing_deps.is_empty() {
            return Err(Error::MissingDependencies {
                missing: missing_deps,
            });
        }

        debug!(edges = edges_to_add.len(), "Wiring dependency edges");
        self.graph.clear_edges();
        for (from, to) in edges_to_add {
            self.graph.add_edge(from, to, ());
        }

        Ok(())
    }

    /// Tasks that depend on `index`, in edge-insertion order.
    #[must_use]
    pub fn dependents(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors_in_insertion_order(index, Direction::Outgoing)
    }

    /// Tasks that `index` depends on, in edge-insertion order.
    #[must_use]
    pub fn prerequisites(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors_in_insertion_order(index, Direction::Incoming)
    }

    fn neighbors_in_insertion_order(&self, index: NodeIndex, dir: Direction) -> Vec<NodeIndex> {
        // petgraph yields the most recently added edge first
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(index, dir).collect();
        neighbors.reverse();
        neighbors
    }

    /// Identifiers of tasks that depend on `name`, or `None` for unknown tasks.
    #[must_use]
    pub fn dependents_of(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.get_node_index(name)?;
        Some(
            self.dependents(index)
                .into_iter()
                .map(|idx| self.graph[idx].name.as_str())
                .collect(),
        )
    }

    /// Identifiers of tasks that `name` depends on, or `None` for unknown tasks.
    #[must_use]
    pub fn prerequisites_of(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.get_node_index(name)?;
        Some(
            self.prerequisites(index)
                .into_iter()
                .map(|idx| self.graph[idx].name.as_str())
                .collect(),
        )
    }

    /// All edges as `(prerequisite, dependent)` identifier pairs, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].name.as_str(),
                self.graph[edge.target()].name.as_str(),
            )
        })
    }

    /// Check if the raw task graph has cycles.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Get the number of tasks in the graph.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of dependency edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check whether the graph holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Check if a task exists in the graph.
    #[must_use]
    pub fn contains_task(&self, name: &str) -> bool {
        self.name_to_node.contains_key(name)
    }

    /// Get the node index for a task by identifier.
    #[must_use]
    pub fn get_node_index(&self, name: &str) -> Option<NodeIndex> {
        self.name_to_node.get(name).copied()
    }

    /// Get a reference to a task node by identifier.
    #[must_use]
    pub fn get_node_by_name(&self, name: &str) -> Option<&GraphNode<T>> {
        self.name_to_node
            .get(name)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Get a reference to a task node by index.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&GraphNode<T>> {
        self.graph.node_weight(index)
    }

    /// Iterate over all nodes in insertion order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeIndex, &GraphNode<T>)> {
        self.graph.node_references()
    }

    /// Iterate over task identifiers in insertion order.
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(|node| node.name.as_str())
    }

    /// Borrow the underlying petgraph graph.
    #[must_use]
    pub fn as_digraph(&self) -> &DiGraph<GraphNode<T>, ()> {
        &self.graph
    }
}

impl<T: TaskNodeData> Default for TaskGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

//! Shortest and longest weighted paths over the condensation.
//!
//! Weights live on components, not edges: entering a component adds its
//! weight, and a path's length includes the weight of its first component.
//! Because the condensation is acyclic, one pass in topological order
//! finalizes every distance.

use crate::condensation::CondensationGraph;
use crate::error::{Error, Result};
use crate::metrics::{Metrics, counters};
use crate::scc::ComponentId;
use crate::topo::sort_components;
use tracing::debug;

/// A path through the condensation and its weighted length.
///
/// "No path" is an empty `path` with `length == None`, which keeps it apart
/// from a real path whose components all weigh zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResult {
    /// Component ids from start to end.
    pub path: Vec<ComponentId>,
    /// Sum of component weights along `path`.
    pub length: Option<u64>,
}

impl PathResult {
    /// The "no path exists" result.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether a path was found.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.length.is_some() && !self.path.is_empty()
    }

    /// Member task ids of every component on the path, in path order.
    #[must_use]
    pub fn task_ids(&self, dag: &CondensationGraph) -> Vec<String> {
        crate::topo::expand_to_tasks(dag, &self.path)
    }
}

/// Single-source shortest distances with predecessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths {
    source: Option<ComponentId>,
    distances: Vec<Option<u64>>,
    predecessors: Vec<Option<ComponentId>>,
}

impl ShortestPaths {
    fn empty() -> Self {
        Self {
            source: None,
            distances: Vec::new(),
            predecessors: Vec::new(),
        }
    }

    /// The source component, `None` for an empty condensation.
    #[must_use]
    pub fn source(&self) -> Option<ComponentId> {
        self.source
    }

    /// Distance to `id`, `None` if unreachable or unknown.
    #[must_use]
    pub fn distance(&self, id: ComponentId) -> Option<u64> {
        self.distances.get(id).copied().flatten()
    }

    /// Distances indexed by component id.
    #[must_use]
    pub fn distances(&self) -> &[Option<u64>] {
        &self.distances
    }

    /// Whether `id` is reachable from the source.
    #[must_use]
    pub fn is_reachable(&self, id: ComponentId) -> bool {
        self.distance(id).is_some()
    }

    /// Number of components reachable from the source, the source included.
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.distances.iter().filter(|d| d.is_some()).count()
    }

    /// Reconstruct the shortest path from the source to `target`.
    #[must_use]
    pub fn path_to(&self, target: ComponentId) -> PathResult {
        match self.distance(target) {
            Some(length) => PathResult {
                path: walk_back(&self.predecessors, target),
                length: Some(length),
            },
            None => PathResult::none(),
        }
    }
}

/// Path queries over a condensation in a fixed topological order.
#[derive(Debug, Clone)]
pub struct PathAnalyzer<'a> {
    dag: &'a CondensationGraph,
    order: Vec<ComponentId>,
}

impl<'a> PathAnalyzer<'a> {
    /// Sort `dag` and prepare for queries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CondensationCycle`] if `dag` is not acyclic.
    pub fn new(dag: &'a CondensationGraph) -> Result<Self> {
        let order = sort_components(dag, &mut Metrics::new())?;
        Ok(Self { dag, order })
    }

    /// Use an order computed earlier by [`sort_components`].
    ///
    /// The order must list every component exactly once with every edge
    /// pointing forward.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order` is not a topological order
    /// of `dag`.
    pub fn with_order(dag: &'a CondensationGraph, order: Vec<ComponentId>) -> Result<Self> {
        check_order(dag, &order)?;
        Ok(Self { dag, order })
    }

    /// The topological order the analyzer walks.
    #[must_use]
    pub fn order(&self) -> &[ComponentId] {
        &self.order
    }

    /// Shortest distances from `source` to every component.
    ///
    /// The source's own distance is its weight; components not reachable
    /// from it stay `None`. An empty condensation yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if `source` is out of range.
    pub fn shortest_paths(&self, source: ComponentId, metrics: &mut Metrics) -> Result<ShortestPaths> {
        metrics.reset();
        metrics.start_timer();

        if self.dag.is_empty() {
            metrics.stop_timer();
            return Ok(ShortestPaths::empty());
        }
        self.check(source)?;

        let n = self.dag.len();
        let mut distances: Vec<Option<u64>> = vec![None; n];
        let mut predecessors: Vec<Option<ComponentId>> = vec![None; n];
        distances[source] = Some(self.dag.weight(source));

        for &u in &self.order {
            metrics.increment(counters::VERTICES_PROCESSED);
            if let Some(du) = distances[u] {
                self.relax_min(u, du, &mut distances, &mut predecessors, metrics);
            }
        }

        metrics.stop_timer();
        let result = ShortestPaths {
            source: Some(source),
            distances,
            predecessors,
        };
        debug!(
            source,
            reachable = result.reachable_count(),
            elapsed_us = metrics.elapsed().as_micros(),
            "Single-source shortest paths computed"
        );
        Ok(result)
    }

    /// Shortest path from `source` to `target`.
    ///
    /// Relaxation starts when the walk reaches `source` and stops once
    /// `target` comes up, since its distance is final at that point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownComponent`] if either id is out of range.
    pub fn shortest_path(
        &self,
        source: ComponentId,
        target: ComponentId,
        metrics: &mut Metrics,
    ) -> Result<PathResult> {
        metrics.reset();
        metrics.start_timer();

        if self.dag.is_empty() {
            metrics.stop_timer();
            return Ok(PathResult::none());
        }
        self.check(source)?;
        self.check(target)?;

        let n = self.dag.len();
        let mut distances: Vec<Option<u64>> = vec![None; n];
        let mut predecessors: Vec<Option<ComponentId>> = vec![None; n];
        distances[source] = Some(self.dag.weight(source));

        let mut started = false;
        for &u in &self.order {
            started |= u == source;
            if !started {
                continue;
            }
            if u == target {
                break;
            }
            if let Some(du) = distances[u] {
                metrics.increment(counters::VERTICES_PROCESSED);
                self.relax_min(u, du, &mut distances, &mut predecessors, metrics);
            }
        }

        metrics.stop_timer();
        let result = match distances[target] {
            Some(length) => PathResult {
                path: walk_back(&predecessors, target),
                length: Some(length),
            },
            None => PathResult::none(),
        };
        debug!(
            source,
            target,
            found = result.exists(),
            length = ?result.length,
            "Point-to-point shortest path computed"
        );
        Ok(result)
    }

    /// The critical path: the heaviest path anywhere in the condensation.
    ///
    /// Every component starts at zero; a component finishes at its start plus
    /// its weight and pushes that finish onto its successors' starts. The
    /// path ends at the component with the largest finish, the lowest id
    /// winning ties. An empty condensation yields [`PathResult::none`].
    pub fn longest_path(&self, metrics: &mut Metrics) -> PathResult {
        metrics.reset();
        metrics.start_timer();

        let n = self.dag.len();
        let mut start = vec![0_u64; n];
        let mut predecessors: Vec<Option<ComponentId>> = vec![None; n];

        for &u in &self.order {
            metrics.increment(counters::VERTICES_PROCESSED);
            let finish = start[u].saturating_add(self.dag.weight(u));

            for &v in self.dag.successors(u) {
                metrics.increment(counters::EDGES_EXAMINED);
                metrics.increment(counters::RELAXATIONS);
                if finish > start[v] {
                    start[v] = finish;
                    predecessors[v] = Some(u);
                    metrics.increment(counters::DISTANCE_UPDATES);
                }
            }
        }

        let mut best: Option<(ComponentId, u64)> = None;
        for (id, &s) in start.iter().enumerate() {
            let finish = s.saturating_add(self.dag.weight(id));
            if best.is_none_or(|(_, longest)| finish > longest) {
                best = Some((id, finish));
            }
        }

        metrics.stop_timer();
        let result = match best {
            Some((end, length)) => PathResult {
                path: walk_back(&predecessors, end),
                length: Some(length),
            },
            None => PathResult::none(),
        };
        debug!(
            length = ?result.length,
            hops = result.path.len(),
            elapsed_us = metrics.elapsed().as_micros(),
            "Critical path computed"
        );
        result
    }

    fn relax_min(
        &self,
        u: ComponentId,
        du: u64,
        distances: &mut [Option<u64>],
        predecessors: &mut [Option<ComponentId>],
        metrics: &mut Metrics,
    ) {
        for &v in self.dag.successors(u) {
            metrics.increment(counters::EDGES_EXAMINED);
            metrics.increment(counters::RELAXATIONS);

            let candidate = du.saturating_add(self.dag.weight(v));
            if distances[v].is_none_or(|current| candidate < current) {
                distances[v] = Some(candidate);
                predecessors[v] = Some(u);
                metrics.increment(counters::DISTANCE_UPDATES);
            }
        }
    }

    fn check(&self, id: ComponentId) -> Result<()> {
        if self.dag.contains(id) {
            Ok(())
        } else {
            Err(Error::UnknownComponent {
                id,
                count: self.dag.len(),
            })
        }
    }
}

fn check_order(dag: &CondensationGraph, order: &[ComponentId]) -> Result<()> {
    let invalid = |reason: String| Err(Error::InvalidOrder { reason });

    if order.len() != dag.len() {
        return invalid(format!(
            "{} entries for {} components",
            order.len(),
            dag.len()
        ));
    }

    let mut position: Vec<Option<usize>> = vec![None; dag.len()];
    for (index, &id) in order.iter().enumerate() {
        match position.get_mut(id) {
            None => return invalid(format!("component {id} is out of range")),
            Some(Some(_)) => return invalid(format!("component {id} appears twice")),
            Some(slot) => *slot = Some(index),
        }
    }

    for (from, successors) in dag.adjacency().iter().enumerate() {
        for &to in successors {
            if position.get(to).copied().flatten() <= position[from] {
                return invalid(format!("edge {from} -> {to} points backwards"));
            }
        }
    }
    Ok(())
}

fn walk_back(predecessors: &[Option<ComponentId>], end: ComponentId) -> Vec<ComponentId> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(prev) = predecessors.get(current).copied().flatten() {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

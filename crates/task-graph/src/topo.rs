//! Topological ordering of the condensation (Kahn's algorithm).

use crate::condensation::CondensationGraph;
use crate::error::{Error, Result};
use crate::metrics::{Metrics, counters};
use crate::scc::ComponentId;
use std::collections::VecDeque;
use tracing::{debug, error};

/// Order component ids so that every edge points forward.
///
/// The queue is seeded with zero in-degree components in id order and
/// drained first-in first-out, so the result is fully determined by the
/// condensation.
///
/// # Errors
///
/// Returns [`Error::CondensationCycle`] if elimination stalls before every
/// component is emitted. A condensation produced by
/// [`CondensationGraph::build`] never triggers this; seeing it means the
/// component graph was assembled incorrectly.
pub fn sort_components(dag: &CondensationGraph, metrics: &mut Metrics) -> Result<Vec<ComponentId>> {
    metrics.reset();
    metrics.start_timer();

    let total = dag.len();
    let mut in_degree = vec![0_usize; total];
    for id in 0..total {
        for &next in dag.successors(id) {
            in_degree[next] += 1;
            metrics.increment(counters::IN_DEGREE_CALCULATIONS);
        }
    }

    let mut queue: VecDeque<ComponentId> = VecDeque::new();
    for (id, &degree) in in_degree.iter().enumerate() {
        if degree == 0 {
            queue.push_back(id);
            metrics.increment(counters::QUEUE_PUSHES);
        }
    }

    let mut order = Vec::with_capacity(total);
    while let Some(current) = queue.pop_front() {
        metrics.increment(counters::QUEUE_POPS);
        metrics.increment(counters::VERTICES_PROCESSED);
        order.push(current);

        for &next in dag.successors(current) {
            in_degree[next] -= 1;
            metrics.increment(counters::IN_DEGREE_UPDATES);
            if in_degree[next] == 0 {
                queue.push_back(next);
                metrics.increment(counters::QUEUE_PUSHES);
            }
        }
    }

    metrics.stop_timer();

    if order.len() != total {
        error!(
            ordered = order.len(),
            total, "Cycle detected in condensation graph"
        );
        return Err(Error::CondensationCycle {
            ordered: order.len(),
            total,
        });
    }

    debug!(
        components = total,
        elapsed_us = metrics.elapsed().as_micros(),
        "Topological sort finished"
    );
    Ok(order)
}

/// Sort the condensation and flatten it into a task order.
///
/// # Errors
///
/// Same as [`sort_components`].
pub fn sort_tasks(dag: &CondensationGraph, metrics: &mut Metrics) -> Result<Vec<String>> {
    let order = sort_components(dag, metrics)?;
    Ok(expand_to_tasks(dag, &order))
}

/// Concatenate the members of each component in `order`.
///
/// Members of one component keep their stored order. Since they depend on
/// each other cyclically, that order is an arbitrary but stable choice.
#[must_use]
pub fn expand_to_tasks(dag: &CondensationGraph, order: &[ComponentId]) -> Vec<String> {
    order
        .iter()
        .filter_map(|&id| dag.component(id))
        .flat_map(|component| component.task_ids.iter().cloned())
        .collect()
}

/// Group components by dependency depth.
///
/// Level 0 holds the components without predecessors; a component sits one
/// level below its deepest predecessor. No edge connects two components of
/// the same level, so each level can run concurrently once the previous
/// levels are done. `order` must be a topological order of `dag`.
#[must_use]
pub fn dependency_levels(dag: &CondensationGraph, order: &[ComponentId]) -> Vec<Vec<ComponentId>> {
    let mut level = vec![0_usize; dag.len()];
    let mut groups: Vec<Vec<ComponentId>> = Vec::new();

    for &id in order {
        let Some(&current) = level.get(id) else {
            continue;
        };
        if current >= groups.len() {
            groups.resize(current + 1, Vec::new());
        }
        groups[current].push(id);

        for &next in dag.successors(id) {
            level[next] = level[next].max(current + 1);
        }
    }

    groups
}

//! Operation counters and timing for the analysis stages.
//!
//! Every algorithm takes a `&mut Metrics`, resets it on entry and leaves the
//! results of that one invocation behind. Callers that want to keep numbers
//! across stages take a [`MetricsSnapshot`] between calls.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Counter names used by the algorithms in this crate.
pub mod counters {
    /// DFS entries into a vertex during SCC detection.
    pub const DFS_CALLS: &str = "dfs_calls";
    /// Vertices assigned a discovery index.
    pub const VERTICES_VISITED: &str = "vertices_visited";
    /// Forward edges followed during SCC detection.
    pub const EDGES_EXPLORED: &str = "edges_explored";
    /// Pushes plus pops on the Tarjan stack.
    pub const STACK_OPERATIONS: &str = "stack_operations";

    /// Task graph edges inspected while condensing.
    pub const EDGES_SCANNED: &str = "edges_scanned";
    /// Distinct component edges recorded.
    pub const EDGES_ADDED: &str = "edges_added";
    /// Edges dropped because both ends share a component.
    pub const EDGES_INTERNAL: &str = "edges_internal";

    /// In-degree increments while seeding Kahn's algorithm.
    pub const IN_DEGREE_CALCULATIONS: &str = "in_degree_calculations";
    /// Components enqueued.
    pub const QUEUE_PUSHES: &str = "queue_pushes";
    /// Components dequeued.
    pub const QUEUE_POPS: &str = "queue_pops";
    /// In-degree decrements during elimination.
    pub const IN_DEGREE_UPDATES: &str = "in_degree_updates";

    /// Vertices finalized by a sort or path pass.
    pub const VERTICES_PROCESSED: &str = "vertices_processed";
    /// Outgoing edges looked at during path relaxation.
    pub const EDGES_EXAMINED: &str = "edges_examined";
    /// Relaxation attempts.
    pub const RELAXATIONS: &str = "relaxations";
    /// Relaxations that improved a distance.
    pub const DISTANCE_UPDATES: &str = "distance_updates";
}

/// Mutable instrumentation handle for a single algorithm run.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    started: Option<Instant>,
    elapsed: Duration,
    counters: BTreeMap<&'static str, u64>,
}

impl Metrics {
    /// Create an empty metrics handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all counters and timing.
    pub fn reset(&mut self) {
        self.started = None;
        self.elapsed = Duration::ZERO;
        self.counters.clear();
    }

    /// Start the wall clock for the current invocation.
    pub fn start_timer(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Stop the wall clock and record the elapsed time.
    ///
    /// Calling this without a matching [`start_timer`](Self::start_timer)
    /// leaves the elapsed time unchanged.
    pub fn stop_timer(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed = started.elapsed();
        }
    }

    /// Elapsed wall time of the last timed invocation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Increment a named counter by one.
    pub fn increment(&mut self, name: &'static str) {
        self.add(name, 1);
    }

    /// Increment a named counter by `amount`.
    pub fn add(&mut self, name: &'static str, amount: u64) {
        *self.counters.entry(name).or_insert(0) += amount;
    }

    /// Current value of a counter, zero if it was never touched.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Copy the current state into an immutable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            elapsed: self.elapsed,
            counters: self
                .counters
                .iter()
                .map(|(name, value)| ((*name).to_string(), *value))
                .collect(),
        }
    }
}

/// Frozen metrics of one algorithm invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Wall time of the invocation.
    pub elapsed: Duration,
    /// Counter values keyed by name, sorted.
    pub counters: BTreeMap<String, u64>,
}

impl MetricsSnapshot {
    /// Value of a counter, zero if absent.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Elapsed: {:.3} ms ({} ns)",
            self.elapsed.as_secs_f64() * 1000.0,
            self.elapsed.as_nanos()
        )?;
        for (name, value) in &self.counters {
            writeln!(f, "  {name}: {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let mut metrics = Metrics::new();
        metrics.increment(counters::RELAXATIONS);
        metrics.increment(counters::RELAXATIONS);
        metrics.add(counters::EDGES_EXAMINED, 5);

        assert_eq!(metrics.counter(counters::RELAXATIONS), 2);
        assert_eq!(metrics.counter(counters::EDGES_EXAMINED), 5);
        assert_eq!(metrics.counter("never_touched"), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut metrics = Metrics::new();
        metrics.start_timer();
        metrics.increment(counters::QUEUE_POPS);
        metrics.stop_timer();

        metrics.reset();
        assert_eq!(metrics.counter(counters::QUEUE_POPS), 0);
        assert_eq!(metrics.elapsed(), Duration::ZERO);
        assert!(metrics.snapshot().counters.is_empty());
    }

    #[test]
    fn test_stop_without_start_keeps_elapsed() {
        let mut metrics = Metrics::new();
        metrics.stop_timer();
        assert_eq!(metrics.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut metrics = Metrics::new();
        metrics.increment(counters::DFS_CALLS);
        let snapshot = metrics.snapshot();
        metrics.increment(counters::DFS_CALLS);

        assert_eq!(snapshot.counter(counters::DFS_CALLS), 1);
        assert_eq!(metrics.counter(counters::DFS_CALLS), 2);
    }

    #[test]
    fn test_snapshot_display_sorted_by_name() {
        let mut metrics = Metrics::new();
        metrics.increment(counters::VERTICES_PROCESSED);
        metrics.increment(counters::EDGES_EXAMINED);
        let rendered = metrics.snapshot().to_string();

        let edges = rendered.find("edges_examined").unwrap();
        let vertices = rendered.find("vertices_processed").unwrap();
        assert!(edges < vertices);
    }
}

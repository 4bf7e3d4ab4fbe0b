//! Error types for task graph operations.

use thiserror::Error;

/// Result type for task graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during task graph operations.
///
/// `DuplicateTask`, `TaskIdMismatch` and `MissingDependencies` describe
/// malformed input and are raised while the graph is built. `InvalidOrder`
/// rejects a caller-supplied component order. `UnknownTask` and
/// `CondensationCycle` are internal-consistency failures: they mean an
/// upstream stage produced something the next stage cannot accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Two tasks were registered under the same identifier.
    #[error("Task '{id}' is defined more than once")]
    DuplicateTask {
        /// The repeated identifier.
        id: String,
    },

    /// One or more tasks depend on tasks that don't exist.
    #[error("Missing dependencies: {}", format_missing(.missing))]
    MissingDependencies {
        /// List of (task, missing_dependency) pairs.
        missing: Vec<(String, String)>,
    },

    /// A task was registered under a key that differs from its own identifier.
    #[error("Task registered as '{key}' identifies itself as '{id}'")]
    TaskIdMismatch {
        /// The key the task was registered under.
        key: String,
        /// The identifier carried by the task.
        id: String,
    },

    /// A task has no entry in the task-to-component map.
    #[error("Task '{id}' is not assigned to any component")]
    UnknownTask {
        /// The unmapped task identifier.
        id: String,
    },

    /// A path query named a component outside the condensation.
    #[error("Component {id} does not exist (condensation has {count} components)")]
    UnknownComponent {
        /// The requested component id.
        id: usize,
        /// Number of components in the condensation.
        count: usize,
    },

    /// A component order handed to a path analyzer is not a topological
    /// order of its condensation.
    #[error("Invalid component order: {reason}")]
    InvalidOrder {
        /// What is wrong with the order.
        reason: String,
    },

    /// Kahn elimination stalled on the condensation graph.
    #[error(
        "Cycle detected in condensation graph: ordered {ordered} of {total} components"
    )]
    CondensationCycle {
        /// Components emitted before the queue ran dry.
        ordered: usize,
        /// Total number of components.
        total: usize,
    },
}

fn format_missing(missing: &[(String, String)]) -> String {
    missing
        .iter()
        .map(|(task, dep)| format!("Task '{task}' depends on missing task '{dep}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

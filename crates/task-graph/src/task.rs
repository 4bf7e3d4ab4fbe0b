//! The stock task type stored in a [`TaskGraph`](crate::TaskGraph).

use crate::TaskNodeData;

/// A unit of work with a duration and the tasks it waits on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Unique identifier, used as the graph key.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Duration in abstract time units.
    pub duration: u64,
    /// Identifiers of tasks that must finish before this one starts.
    pub dependencies: Vec<String>,
}

impl Task {
    /// Create a task with no dependencies.
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration,
            dependencies: Vec::new(),
        }
    }

    /// Builder-style helper that replaces the dependency list.
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }
}

impl TaskNodeData for Task {
    fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.iter().map(String::as_str)
    }

    fn duration(&self) -> u64 {
        self.duration
    }

    fn task_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

//! Task file loading and saving.
//!
//! The task file is a JSON array of records:
//!
//! ```json
//! [
//!   { "id": "T1", "name": "Street Cleaning", "duration": 5, "dependencies": [] },
//!   { "id": "T2", "name": "Sensor Maintenance", "duration": 3, "dependencies": ["T1"] }
//! ]
//! ```

use crate::errors::{CliError, Result};
use dagsched_task_graph::{Task, TaskGraph};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// One entry of the task file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub name: String,
    pub duration: u64,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Self::new(record.id, record.name, record.duration).with_dependencies(record.dependencies)
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            duration: task.duration,
            dependencies: task.dependencies.clone(),
        }
    }
}

/// Parse task file contents. `path` is only used in error reports.
pub fn parse_tasks(path: &Path, contents: &str) -> Result<Vec<Task>> {
    let records: Vec<TaskRecord> =
        serde_json::from_str(contents).map_err(|e| CliError::parse_error(path, contents, &e))?;

    if records.is_empty() {
        return Err(CliError::EmptyTaskFile {
            path: path.to_path_buf(),
        });
    }

    Ok(records.into_iter().map(Task::from).collect())
}

/// Read a task file and build its graph.
pub fn load_graph(path: &Path) -> Result<TaskGraph<Task>> {
    let contents =
        fs::read_to_string(path).map_err(|e| CliError::file_error("read", path, e))?;
    let tasks = parse_tasks(path, &contents)?;
    debug!(path = %path.display(), tasks = tasks.len(), "Parsed task file");

    let graph = TaskGraph::from_tasks(tasks.into_iter().map(|task| (task.id.clone(), task)))?;
    info!(
        path = %path.display(),
        tasks = graph.task_count(),
        edges = graph.edge_count(),
        "Task graph loaded"
    );
    Ok(graph)
}

/// Write `tasks` as a pretty-printed task file.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    let records: Vec<TaskRecord> = tasks.iter().map(TaskRecord::from).collect();
    let mut json = serde_json::to_string_pretty(&records)
        .map_err(|e| CliError::serialize_error("task file", e))?;
    json.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| CliError::file_error("create directory", parent, e))?;
    }
    fs::write(path, json).map_err(|e| CliError::file_error("write", path, e))?;
    debug!(path = %path.display(), tasks = tasks.len(), "Task file written");
    Ok(())
}

/// The twelve-task sample graph.
///
/// `T9 -> T10 -> T11 -> T12 -> T9` forms a cycle; everything else is acyclic.
/// The older sample data listed T12 as depending on T11 and T9, which never
/// closes that loop. Here T9 depends on T12 instead, so results such as the
/// critical path length of 35 differ from what that data produced.
pub fn sample_tasks() -> Vec<Task> {
    let task = |id: &str, name: &str, duration: u64, deps: &[&str]| {
        Task::new(id, name, duration).with_dependencies(deps.iter().copied())
    };

    vec![
        task("T1", "Street Cleaning Zone A", 5, &[]),
        task("T2", "Street Cleaning Zone B", 4, &[]),
        task("T3", "Repair Traffic Light 1", 6, &["T1"]),
        task("T4", "Repair Traffic Light 2", 5, &["T2"]),
        task("T5", "Camera Installation", 8, &["T3", "T4"]),
        task("T6", "Sensor Calibration", 3, &["T5"]),
        task("T7", "Data Analytics Setup", 7, &["T6"]),
        task("T8", "Network Configuration", 4, &["T5"]),
        task("T9", "System Test Phase 1", 6, &["T7", "T8", "T12"]),
        task("T10", "System Test Phase 2", 5, &["T9"]),
        task("T11", "Bug Fixes", 4, &["T10"]),
        task("T12", "Regression Testing", 3, &["T11"]),
    ]
}

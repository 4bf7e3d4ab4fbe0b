//! Synthetic task datasets.
//!
//! Nine datasets across three sizes. Acyclic sets only add edges from a
//! lower to a higher task index; cyclic sets add the same kind of structure
//! and then one to three back edges. A fixed seed reproduces every file.

use crate::errors::{CliError, Result};
use crate::loader::save_tasks;
use dagsched_task_graph::Task;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 42;

const TASK_TYPES: [&str; 18] = [
    "Street Cleaning",
    "Traffic Light Repair",
    "Camera Installation",
    "Sensor Calibration",
    "Network Config",
    "Data Analytics",
    "System Test",
    "Bug Fixes",
    "Security Audit",
    "Performance Tuning",
    "Database Migration",
    "UI Update",
    "API Integration",
    "Load Testing",
    "Documentation",
    "Code Review",
    "Deployment",
    "Monitoring Setup",
];

/// Shape of one generated dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetProfile {
    pub file_name: &'static str,
    pub description: &'static str,
    pub task_count: usize,
    pub density: f64,
    pub cyclic: bool,
}

/// The nine standard datasets, smallest first.
pub const DATASETS: [DatasetProfile; 9] = [
    DatasetProfile {
        file_name: "small_dag_sparse.json",
        description: "Small sparse DAG",
        task_count: 6,
        density: 0.3,
        cyclic: false,
    },
    DatasetProfile {
        file_name: "small_cyclic_medium.json",
        description: "Small graph with 1-2 cycles",
        task_count: 8,
        density: 0.4,
        cyclic: true,
    },
    DatasetProfile {
        file_name: "small_dag_dense.json",
        description: "Small dense DAG",
        task_count: 10,
        density: 0.5,
        cyclic: false,
    },
    DatasetProfile {
        file_name: "medium_mixed_sparse.json",
        description: "Medium sparse with multiple SCCs",
        task_count: 12,
        density: 0.25,
        cyclic: true,
    },
    DatasetProfile {
        file_name: "medium_dag.json",
        description: "Medium DAG",
        task_count: 15,
        density: 0.35,
        cyclic: false,
    },
    DatasetProfile {
        file_name: "medium_cyclic_dense.json",
        description: "Medium dense with several cycles",
        task_count: 18,
        density: 0.45,
        cyclic: true,
    },
    DatasetProfile {
        file_name: "large_sparse_dag.json",
        description: "Large sparse DAG for performance testing",
        task_count: 25,
        density: 0.15,
        cyclic: false,
    },
    DatasetProfile {
        file_name: "large_mixed.json",
        description: "Large mixed structure with multiple SCCs",
        task_count: 35,
        density: 0.25,
        cyclic: true,
    },
    DatasetProfile {
        file_name: "large_dense.json",
        description: "Large dense DAG for timing tests",
        task_count: 45,
        density: 0.30,
        cyclic: false,
    },
];

/// What was written for one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub path: PathBuf,
    pub description: &'static str,
    pub tasks: usize,
    pub edges: usize,
    pub density: f64,
    pub cyclic: bool,
}

/// Tracks added edges so a pair is never added twice.
struct EdgeSet<'a> {
    tasks: &'a mut [Task],
    seen: HashSet<(usize, usize)>,
}

impl EdgeSet<'_> {
    /// Make task `to` depend on task `from`. Returns whether the edge is new.
    fn add(&mut self, from: usize, to: usize) -> bool {
        if !self.seen.insert((from, to)) {
            return false;
        }
        let from_id = self.tasks[from].id.clone();
        self.tasks[to].dependencies.push(from_id);
        true
    }

    fn len(&self) -> usize {
        self.seen.len()
    }

    /// Forward edges `i -> j` (`i < j`), each with probability `chance`,
    /// until `limit` edges exist.
    fn add_forward(&mut self, rng: &mut StdRng, chance: f64, limit: usize) {
        let count = self.tasks.len();
        for i in 0..count {
            for j in (i + 1)..count {
                if self.len() >= limit {
                    return;
                }
                if rng.random_bool(chance) {
                    self.add(i, j);
                }
            }
        }
    }
}

/// Generate the tasks of one dataset.
pub fn generate_tasks(profile: &DatasetProfile, rng: &mut StdRng) -> Vec<Task> {
    let mut tasks: Vec<Task> = (0..profile.task_count)
        .map(|i| {
            let kind = TASK_TYPES[i % TASK_TYPES.len()];
            let round = i / TASK_TYPES.len() + 1;
            Task::new(
                format!("T{}", i + 1),
                format!("{kind} #{round}"),
                rng.random_range(2..=9),
            )
        })
        .collect();

    let max_edges = profile.task_count * profile.task_count.saturating_sub(1) / 2;
    let target_edges = (max_edges as f64 * profile.density) as usize;

    let mut edges = EdgeSet {
        tasks: &mut tasks,
        seen: HashSet::new(),
    };

    if profile.cyclic {
        edges.add_forward(rng, 0.3, target_edges * 2 / 3);

        let back_edges = rng.random_range(1..=3);
        for _ in 0..back_edges {
            if edges.len() >= target_edges || profile.task_count < 2 {
                break;
            }
            // `to < from`, so `to` ends up depending on a later task
            let from = rng.random_range(1..profile.task_count);
            let to = rng.random_range(0..from);
            edges.add(from, to);
        }
    } else {
        edges.add_forward(rng, 0.4, target_edges);
    }

    tasks
}

/// Generate all nine datasets into `output_dir`.
pub fn generate_all(output_dir: &Path, seed: u64) -> Result<Vec<DatasetSummary>> {
    fs::create_dir_all(output_dir)
        .map_err(|e| CliError::file_error("create directory", output_dir, e))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut summaries = Vec::with_capacity(DATASETS.len());

    for profile in &DATASETS {
        let tasks = generate_tasks(profile, &mut rng);
        let path = output_dir.join(profile.file_name);
        save_tasks(&path, &tasks)?;

        let summary = DatasetSummary {
            path,
            description: profile.description,
            tasks: tasks.len(),
            edges: tasks.iter().map(|t| t.dependencies.len()).sum(),
            density: profile.density,
            cyclic: profile.cyclic,
        };
        info!(
            file = profile.file_name,
            tasks = summary.tasks,
            edges = summary.edges,
            cyclic = summary.cyclic,
            "Dataset generated"
        );
        summaries.push(summary);
    }

    Ok(summaries)
}

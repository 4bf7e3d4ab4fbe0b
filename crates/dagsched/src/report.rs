//! Report rendering for analysis results.
//!
//! Reports are plain serializable data built from an [`Analysis`]; they are
//! rendered either as sectioned text or as pretty JSON. This is the only
//! module that writes to stdout.

use crate::errors::{CliError, Result};
use crate::generator::DatasetSummary;
use dagsched_task_graph::{
    Analysis, ComponentId, CondensationGraph, MetricsSnapshot, PathResult, ShortestPaths, TaskGraph,
    TaskNodeData,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write as _;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable sections
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    pub id: ComponentId,
    pub tasks: Vec<String>,
    pub weight: u64,
    pub cyclic: bool,
    pub successors: Vec<ComponentId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathReport {
    pub components: Vec<ComponentId>,
    pub tasks: Vec<String>,
    pub length: Option<u64>,
    pub exists: bool,
}

impl PathReport {
    pub fn new(path: &PathResult, dag: &CondensationGraph) -> Self {
        Self {
            components: path.path.clone(),
            tasks: path.task_ids(dag),
            length: path.length,
            exists: path.exists(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DistanceReport {
    pub component: ComponentId,
    pub distance: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShortestPathsReport {
    pub source: Option<ComponentId>,
    pub distances: Vec<DistanceReport>,
}

impl From<&ShortestPaths> for ShortestPathsReport {
    fn from(paths: &ShortestPaths) -> Self {
        Self {
            source: paths.source(),
            distances: paths
                .distances()
                .iter()
                .enumerate()
                .map(|(component, distance)| DistanceReport {
                    component,
                    distance: *distance,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PointToPointReport {
    pub source: ComponentId,
    pub target: ComponentId,
    #[serde(flatten)]
    pub path: PathReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageMetricsReport {
    pub stage: String,
    pub elapsed_ns: u128,
    pub counters: BTreeMap<String, u64>,
}

impl StageMetricsReport {
    pub fn new(stage: impl ToString, snapshot: &MetricsSnapshot) -> Self {
        Self {
            stage: stage.to_string(),
            elapsed_ns: snapshot.elapsed.as_nanos(),
            counters: snapshot.counters.clone(),
        }
    }
}

/// Everything `dagsched analyze` reports.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub tasks: usize,
    pub edges: usize,
    pub components: Vec<ComponentReport>,
    pub condensation_edges: usize,
    pub component_order: Vec<ComponentId>,
    pub task_order: Vec<String>,
    pub levels: Vec<Vec<ComponentId>>,
    pub critical_path: PathReport,
    pub shortest_paths: ShortestPathsReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_to_point: Option<PointToPointReport>,
    pub metrics: Vec<StageMetricsReport>,
}

impl AnalysisReport {
    /// Collect the pipeline outputs. Query results are attached afterwards.
    pub fn new<T: TaskNodeData>(
        graph: &TaskGraph<T>,
        analysis: &Analysis,
        shortest_paths: ShortestPathsReport,
    ) -> Self {
        let dag = &analysis.condensation;
        let components = dag
            .components()
            .iter()
            .map(|component| ComponentReport {
                id: component.id,
                tasks: component.task_ids.clone(),
                weight: dag.weight(component.id),
                cyclic: component.is_cyclic(graph),
                successors: dag.successors(component.id).to_vec(),
            })
            .collect();

        Self {
            tasks: graph.task_count(),
            edges: graph.edge_count(),
            components,
            condensation_edges: dag.edge_count(),
            component_order: analysis.component_order.clone(),
            task_order: analysis.task_order.clone(),
            levels: analysis.levels.clone(),
            critical_path: PathReport::new(&analysis.critical_path, dag),
            shortest_paths,
            point_to_point: None,
            metrics: analysis
                .stage_metrics
                .iter()
                .map(|(stage, snapshot)| StageMetricsReport::new(stage, snapshot))
                .collect(),
        }
    }
}

fn heading(out: &mut String, title: &str) {
    let rule = "=".repeat(50);
    let _ = writeln!(out, "\n{rule}\n{title}\n{rule}");
}

fn write_metrics(out: &mut String, metrics: &[StageMetricsReport], stage: &str) {
    for entry in metrics.iter().filter(|m| m.stage == stage) {
        let _ = writeln!(
            out,
            "\nMetrics ({}): {:.3} ms ({} ns)",
            entry.stage,
            entry.elapsed_ns as f64 / 1_000_000.0,
            entry.elapsed_ns
        );
        for (name, value) in &entry.counters {
            let _ = writeln!(out, "  {name}: {value}");
        }
    }
}

fn format_length(length: Option<u64>) -> String {
    length.map_or_else(|| "no path".to_string(), |l| l.to_string())
}

/// Render the sectioned text report.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Task graph: {} tasks, {} dependencies",
        report.tasks, report.edges
    );

    heading(&mut out, "STRONGLY CONNECTED COMPONENTS");
    let cyclic = report.components.iter().filter(|c| c.cyclic).count();
    let _ = writeln!(
        out,
        "Found {} components ({cyclic} cyclic)",
        report.components.len()
    );
    for component in &report.components {
        let marker = if component.cyclic { " [cycle]" } else { "" };
        let _ = writeln!(
            out,
            "  Component {}{marker}: {:?}",
            component.id, component.tasks
        );
    }
    write_metrics(&mut out, &report.metrics, "scc");

    heading(&mut out, "CONDENSATION GRAPH");
    let _ = writeln!(
        out,
        "{} components, {} edges",
        report.components.len(),
        report.condensation_edges
    );
    for component in &report.components {
        let _ = writeln!(
            out,
            "  Component {} (weight={}) -> {:?}",
            component.id, component.weight, component.successors
        );
    }
    write_metrics(&mut out, &report.metrics, "condensation");

    heading(&mut out, "TOPOLOGICAL ORDER");
    let _ = writeln!(out, "Components: {:?}", report.component_order);
    let _ = writeln!(out, "Tasks: {:?}", report.task_order);
    for (level, members) in report.levels.iter().enumerate() {
        let _ = writeln!(out, "  Level {level}: {members:?}");
    }
    write_metrics(&mut out, &report.metrics, "topological_sort");

    heading(&mut out, "CRITICAL PATH");
    let critical = &report.critical_path;
    let _ = writeln!(out, "Length: {}", format_length(critical.length));
    let _ = writeln!(out, "Components: {:?}", critical.components);
    let _ = writeln!(out, "Tasks: {:?}", critical.tasks);
    write_metrics(&mut out, &report.metrics, "critical_path");

    heading(&mut out, "SHORTEST PATHS");
    match report.shortest_paths.source {
        Some(source) => {
            let _ = writeln!(out, "From component {source}:");
            for entry in &report.shortest_paths.distances {
                match entry.distance {
                    Some(distance) => {
                        let _ = writeln!(
                            out,
                            "  Component {}: distance = {distance}",
                            entry.component
                        );
                    }
                    None => {
                        let _ = writeln!(out, "  Component {}: unreachable", entry.component);
                    }
                }
            }
        }
        None => {
            let _ = writeln!(out, "No components");
        }
    }
    write_metrics(&mut out, &report.metrics, "shortest_paths");

    if let Some(p2p) = &report.point_to_point {
        heading(&mut out, "POINT-TO-POINT PATH");
        let _ = writeln!(
            out,
            "Component {} -> component {}: {}",
            p2p.source,
            p2p.target,
            format_length(p2p.path.length)
        );
        if p2p.path.exists {
            let _ = writeln!(out, "Components: {:?}", p2p.path.components);
            let _ = writeln!(out, "Tasks: {:?}", p2p.path.tasks);
        }
        write_metrics(&mut out, &report.metrics, "point_to_point");
    }

    out
}

/// Serialize any report as pretty JSON.
pub fn render_json<S: Serialize>(report: &S) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| CliError::serialize_error("report", e))
}

/// Render the dataset generation summary.
pub fn render_datasets(summaries: &[DatasetSummary]) -> String {
    let mut out = String::new();
    for summary in summaries {
        let name = summary
            .path
            .file_name()
            .map_or_else(|| summary.path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let _ = writeln!(out, "Generated: {name}");
        let _ = writeln!(out, "  Description: {}", summary.description);
        let _ = writeln!(
            out,
            "  Vertices: {}, Edges: {}, Density: {:.2}",
            summary.tasks, summary.edges, summary.density
        );
        let _ = writeln!(
            out,
            "  Cyclic: {}",
            if summary.cyclic { "Yes" } else { "No (DAG)" }
        );
    }
    let _ = writeln!(out, "Generated {} datasets", summaries.len());
    out
}

/// Write a rendered report to stdout.
pub fn emit(rendered: &str) -> Result<()> {
    let write = || -> std::io::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        if !rendered.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()
    };
    write().map_err(|e| CliError::file_error("write", "<stdout>", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagsched_task_graph::{Metrics, Task, analyze};

    fn report_for(tasks: Vec<Task>) -> AnalysisReport {
        let graph = TaskGraph::from_tasks(tasks.into_iter().map(|t| (t.id.clone(), t))).unwrap();
        let analysis = analyze(&graph).unwrap();
        let shortest = analysis
            .path_analyzer()
            .unwrap()
            .shortest_paths(0, &mut Metrics::new())
            .unwrap();
        AnalysisReport::new(&graph, &analysis, ShortestPathsReport::from(&shortest))
    }

    fn two_cycles() -> Vec<Task> {
        vec![
            Task::new("T1", "one", 1).with_dependencies(["T2"]),
            Task::new("T2", "two", 2).with_dependencies(["T1"]),
            Task::new("T3", "three", 3).with_dependencies(["T4"]),
            Task::new("T4", "four", 4).with_dependencies(["T3"]),
        ]
    }

    #[test]
    fn test_text_report_sections() {
        let report = report_for(two_cycles());
        let text = render_text(&report);

        assert!(text.contains("STRONGLY CONNECTED COMPONENTS"));
        assert!(text.contains("Found 2 components (2 cyclic)"));
        assert!(text.contains("CRITICAL PATH"));
        assert!(text.contains("Length: 4"));
        assert!(text.contains("Component 1: unreachable"));
        assert!(text.contains("Metrics (scc)"));
        assert!(!text.contains("POINT-TO-POINT"));
    }

    #[test]
    fn test_json_report_shape() {
        let report = report_for(two_cycles());
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        assert_eq!(json["tasks"], 4);
        assert_eq!(json["components"].as_array().unwrap().len(), 2);
        assert_eq!(json["condensation_edges"], 0);
        assert_eq!(json["critical_path"]["length"], 4);
        assert_eq!(json["shortest_paths"]["distances"][1]["distance"], serde_json::Value::Null);
        assert!(json.get("point_to_point").is_none());
        assert_eq!(json["metrics"][0]["stage"], "scc");
    }

    #[test]
    fn test_point_to_point_flattens_path() {
        let mut report = report_for(two_cycles());
        report.point_to_point = Some(PointToPointReport {
            source: 0,
            target: 1,
            path: PathReport {
                components: vec![],
                tasks: vec![],
                length: None,
                exists: false,
            },
        });

        let json: serde_json::Value =
            serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(json["point_to_point"]["exists"], false);
        assert!(render_text(&report).contains("Component 0 -> component 1: no path"));
    }

    #[test]
    fn test_dataset_summary_text() {
        let summaries = vec![DatasetSummary {
            path: "data/small.json".into(),
            description: "Small",
            tasks: 6,
            edges: 3,
            density: 0.3,
            cyclic: false,
        }];
        let text = render_datasets(&summaries);

        assert!(text.contains("Generated: small.json"));
        assert!(text.contains("Vertices: 6, Edges: 3, Density: 0.30"));
        assert!(text.contains("Cyclic: No (DAG)"));
    }
}

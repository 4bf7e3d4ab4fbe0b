use crate::errors::{CliError, Result};
use crate::loader::load_graph;
use crate::report::{
    AnalysisReport, OutputFormat, PathReport, PointToPointReport, ShortestPathsReport,
    StageMetricsReport, emit, render_json, render_text,
};
use dagsched_task_graph::{Analysis, ComponentId, Metrics, analyze};
use std::path::Path;
use tracing::debug;

/// Map a task id given on the command line to its component.
fn resolve_component(analysis: &Analysis, flag: &str, task_id: &str) -> Result<ComponentId> {
    analysis.scc.component_of(task_id).ok_or_else(|| {
        CliError::invalid_argument(flag, format!("no task '{task_id}' in the task file"))
    })
}

/// Build the full report for `file`.
pub fn build_report(
    file: &Path,
    source: Option<&str>,
    target: Option<&str>,
) -> Result<AnalysisReport> {
    let graph = load_graph(file)?;
    let analysis = analyze(&graph)?;
    let analyzer = analysis.path_analyzer()?;

    let source_component = match source {
        Some(task_id) => resolve_component(&analysis, "--source", task_id)?,
        None => 0,
    };
    let target_component = target
        .map(|task_id| resolve_component(&analysis, "--target", task_id))
        .transpose()?;

    let mut metrics = Metrics::new();
    let shortest = analyzer.shortest_paths(source_component, &mut metrics)?;
    debug!(
        source = source_component,
        reachable = shortest.reachable_count(),
        "Single-source shortest paths computed"
    );

    let mut report = AnalysisReport::new(&graph, &analysis, ShortestPathsReport::from(&shortest));
    report
        .metrics
        .push(StageMetricsReport::new("shortest_paths", &metrics.snapshot()));

    if let Some(target_component) = target_component {
        let path = analyzer.shortest_path(source_component, target_component, &mut metrics)?;
        report.point_to_point = Some(PointToPointReport {
            source: source_component,
            target: target_component,
            path: PathReport::new(&path, &analysis.condensation),
        });
        report
            .metrics
            .push(StageMetricsReport::new("point_to_point", &metrics.snapshot()));
    }

    Ok(report)
}

/// Analyze `file` and print the report.
pub fn execute(
    file: &Path,
    source: Option<&str>,
    target: Option<&str>,
    output: OutputFormat,
) -> Result<()> {
    let report = build_report(file, source, target)?;
    let rendered = match output {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => render_json(&report)?,
    };
    emit(&rendered)
}

use std::fmt::Write;

use crate::autocancel::Report;

use super::styling::{done, failed, muted, section};
use super::tables::{color_coded_canceled_cell, color_coded_failed_cell, create_table, label_cell};

/// One-line result, the only stdout output of a non-verbose run.
pub fn summary_line(report: &Report) -> String {
    if report.dry_run {
        format!(
            "[done] dry-run. scanned={} matched={}",
            report.scanned_pipelines, report.matched_workflows
        )
    } else {
        format!(
            "[done] cancelled={} scanned={} matched={}",
            report.canceled_workflows.len(),
            report.scanned_pipelines,
            report.matched_workflows
        )
    }
}

/// Prints a table with the resolved context and the counts of a run.
pub fn print_summary(report: &Report) {
    eprintln!("{}", render_summary(report));
}

fn render_summary(report: &Report) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", section("📋", "Summary"));

    let current = &report.current;
    let mut table = create_table();
    table.add_row(vec![label_cell("Project"), current.project_slug.clone().into()]);
    table.add_row(vec![label_cell("Branch"), current.branch.clone().into()]);
    table.add_row(vec![label_cell("Pipeline"), format!("#{}", current.pipeline_number).into()]);
    table.add_row(vec![
        label_cell("Workflow match"),
        current
            .workflow_name_pattern
            .as_ref()
            .map_or_else(
                || format!("= {}", current.workflow_name),
                |pattern| format!("~ /{pattern}/"),
            )
            .into(),
    ]);
    table.add_row(vec![
        label_cell("Scanned pipelines"),
        report.scanned_pipelines.to_string().into(),
    ]);
    table.add_row(vec![
        label_cell("Matched workflows"),
        report.matched_workflows.to_string().into(),
    ]);

    if report.dry_run {
        table.add_row(vec![label_cell("Canceled workflows"), "dry-run".into()]);
    } else {
        table.add_row(vec![
            label_cell("Canceled workflows"),
            color_coded_canceled_cell(report.canceled_workflows.len(), report.failed_cancels.len()),
        ]);
        table.add_row(vec![
            label_cell("Failed cancels"),
            color_coded_failed_cell(report.failed_cancels.len()),
        ]);
    }
    let _ = writeln!(output, "{table}");

    if !report.canceled_workflows.is_empty() {
        let _ = writeln!(output, "{}", done("Canceled:"));
        for id in &report.canceled_workflows {
            let _ = writeln!(output, "  {}", id);
        }
    }
    if !report.failed_cancels.is_empty() {
        let _ = writeln!(output, "{}", failed("Cancel failed:"));
        for id in &report.failed_cancels {
            let _ = writeln!(output, "  {}", muted(id));
        }
    }

    output
}

use serde::Serialize;

use super::context::RunContext;
use super::executor::CancelOutcome;

/// Summary of one invocation. Built once, returned to the caller, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub canceled_workflows: Vec<String>,
    pub failed_cancels: Vec<String>,
    pub scanned_pipelines: usize,
    pub matched_workflows: usize,
    pub current: RunContext,
    pub dry_run: bool,
}

impl Report {
    pub(super) fn build(
        current: RunContext,
        scanned_pipelines: usize,
        matched_workflows: usize,
        outcome: CancelOutcome,
        dry_run: bool,
    ) -> Self {
        Self {
            canceled_workflows: outcome.canceled,
            failed_cancels: outcome.failed,
            scanned_pipelines,
            matched_workflows,
            current,
            dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_camel_case() {
        let report = Report::build(
            RunContext {
                project_slug: "gh/org/repo".to_string(),
                branch: "main".to_string(),
                workflow_name: "build".to_string(),
                workflow_name_pattern: None,
                pipeline_id: "pipe-42".to_string(),
                pipeline_number: 42,
            },
            2,
            2,
            CancelOutcome {
                canceled: vec!["wf-1".to_string()],
                failed: vec!["wf-2".to_string()],
            },
            false,
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["canceledWorkflows"], serde_json::json!(["wf-1"]));
        assert_eq!(json["failedCancels"], serde_json::json!(["wf-2"]));
        assert_eq!(json["scannedPipelines"], 2);
        assert_eq!(json["matchedWorkflows"], 2);
        assert_eq!(json["dryRun"], false);
        assert_eq!(json["current"]["projectSlug"], "gh/org/repo");
        assert_eq!(json["current"]["pipelineNumber"], 42);
        assert!(json["current"].get("workflowNamePattern").is_none());
    }
}

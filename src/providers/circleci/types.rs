use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A CircleCI pipeline as returned by `GET /pipeline/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pipeline {
    pub id: String,
    /// Per-project monotonic pipeline number, the only ordering key
    pub number: u64,
    /// Project slug in `<vcs>/<org>/<repo>` form (e.g. "gh/org/repo")
    pub project_slug: String,
    #[serde(default)]
    pub vcs: PipelineVcs,
}

impl Pipeline {
    /// Branch that triggered the pipeline, `None` for tag builds.
    pub fn branch(&self) -> Option<&str> {
        self.vcs.branch.as_deref().filter(|b| !b.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PipelineVcs {
    pub branch: Option<String>,
    pub tag: Option<String>,
}

/// One page of `GET /project/{slug}/pipeline`.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelinePage {
    pub items: Vec<PipelineSummary>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Pipeline entry in a project pipeline listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineSummary {
    pub id: String,
    pub number: u64,
    #[serde(default)]
    pub state: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of `GET /pipeline/{id}/workflow`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowPage {
    pub items: Vec<Workflow>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A workflow snapshot. Never re-fetched within one run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub status: WorkflowStatus,
    pub pipeline_number: u64,
}

/// Workflow lifecycle status.
///
/// `Unknown` absorbs statuses introduced by the provider after this build;
/// such workflows are never cancellation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Running,
    OnHold,
    NotRun,
    Success,
    Failed,
    Error,
    Failing,
    Canceled,
    Unauthorized,
    #[serde(other)]
    Unknown,
}

impl WorkflowStatus {
    pub const DEFAULT_TARGETS: [WorkflowStatus; 2] = [WorkflowStatus::Running, WorkflowStatus::OnHold];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::OnHold => "on_hold",
            Self::NotRun => "not_run",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Failing => "failing",
            Self::Canceled => "canceled",
            Self::Unauthorized => "unauthorized",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "on_hold" => Ok(Self::OnHold),
            "not_run" => Ok(Self::NotRun),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "error" => Ok(Self::Error),
            "failing" => Ok(Self::Failing),
            "canceled" => Ok(Self::Canceled),
            "unauthorized" => Ok(Self::Unauthorized),
            other => Err(format!(
                "unknown workflow status '{other}' (expected one of: running, on_hold, not_run, success, failed, error, failing, canceled, unauthorized)"
            )),
        }
    }
}

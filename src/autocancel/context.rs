use log::debug;
use regex::Regex;
use serde::Serialize;

use super::{fetch_workflows, AutocancelOptions, Pacer};
use crate::error::{AutocancelError, Result};
use crate::providers::CiProvider;

/// Workflow name predicate. A pattern always wins over an exact name.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    Exact(String),
    Pattern(Regex),
}

impl NameMatcher {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(expected) => name == expected,
            Self::Pattern(re) => re.is_match(name),
        }
    }
}

/// The resolved execution context echoed back in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    pub project_slug: String,
    pub branch: String,
    pub workflow_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_name_pattern: Option<String>,
    pub pipeline_id: String,
    /// Pipelines numbered at or above this are never scanned
    pub pipeline_number: u64,
}

#[derive(Debug)]
pub struct ResolvedContext {
    pub run: RunContext,
    pub matcher: NameMatcher,
}

pub(super) async fn resolve_context<P>(
    provider: &P,
    options: &AutocancelOptions,
    pacer: Pacer,
) -> Result<ResolvedContext>
where
    P: CiProvider + ?Sized,
{
    // An unusable pattern must fail before any remote call.
    let pattern = options
        .workflow_name_pattern
        .as_deref()
        .map(Regex::new)
        .transpose()?;

    let (project_slug, branch, fetched_number) = match (&options.project_slug, &options.branch) {
        (Some(slug), Some(branch)) => {
            debug!("[context] slug and branch supplied, skipping pipeline lookup");
            (slug.clone(), Some(branch.clone()), None)
        }
        _ => {
            let current = provider.get_pipeline(&options.pipeline_id).await?;
            let branch = options
                .branch
                .clone()
                .or_else(|| current.branch().map(str::to_string));
            let slug = options
                .project_slug
                .clone()
                .unwrap_or_else(|| current.project_slug.clone());
            (slug, branch, Some(current.number))
        }
    };

    let branch = branch
        .filter(|b| !b.trim().is_empty())
        .ok_or(AutocancelError::UnresolvedBranch)?;

    let workflows = fetch_workflows(provider, &options.pipeline_id, pacer).await?;
    let current_workflow = workflows
        .into_iter()
        .find(|w| w.id == options.workflow_id)
        .ok_or_else(|| AutocancelError::WorkflowNotFound {
            workflow_id: options.workflow_id.clone(),
            pipeline_id: options.pipeline_id.clone(),
        })?;

    // The workflow always carries its pipeline number, so ordering applies
    // even when the pipeline record was never fetched.
    let pipeline_number = fetched_number.unwrap_or(current_workflow.pipeline_number);
    let workflow_name = options
        .workflow_name
        .clone()
        .unwrap_or(current_workflow.name);

    let matcher = match pattern {
        Some(re) => NameMatcher::Pattern(re),
        None => NameMatcher::Exact(workflow_name.clone()),
    };

    Ok(ResolvedContext {
        run: RunContext {
            project_slug,
            branch,
            workflow_name,
            workflow_name_pattern: options.workflow_name_pattern.clone(),
            pipeline_id: options.pipeline_id.clone(),
            pipeline_number,
        },
        matcher,
    })
}

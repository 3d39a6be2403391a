use std::collections::BTreeSet;

use log::debug;

use super::context::NameMatcher;
use super::{fetch_workflows, Pacer};
use crate::error::Result;
use crate::providers::{CiProvider, Workflow, WorkflowStatus};

/// A workflow selected for cancellation, tagged with its owning pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub pipeline_id: String,
    pub workflow: Workflow,
}

pub fn is_candidate(
    workflow: &Workflow,
    matcher: &NameMatcher,
    statuses: &BTreeSet<WorkflowStatus>,
) -> bool {
    matcher.matches(&workflow.name) && statuses.contains(&workflow.status)
}

/// Lists the workflows of every older pipeline and keeps the matching ones.
///
/// Read-only: nothing is canceled here, so the full match count is known
/// before the first cancel call.
pub(super) async fn match_workflows<P>(
    provider: &P,
    pipeline_ids: &[String],
    matcher: &NameMatcher,
    statuses: &BTreeSet<WorkflowStatus>,
    pacer: Pacer,
) -> Result<Vec<Candidate>>
where
    P: CiProvider + ?Sized,
{
    let mut candidates = Vec::new();

    for pipeline_id in pipeline_ids {
        let workflows = fetch_workflows(provider, pipeline_id, pacer).await?;

        let before = candidates.len();
        for workflow in workflows {
            if is_candidate(&workflow, matcher, statuses) {
                debug!(
                    "[match] wf={} name=\"{}\" status={} (#{})",
                    workflow.id, workflow.name, workflow.status, workflow.pipeline_number
                );
                candidates.push(Candidate {
                    pipeline_id: pipeline_id.clone(),
                    workflow,
                });
            }
        }
        debug!(
            "[match] pipeline {pipeline_id}: {} candidates",
            candidates.len() - before
        );

        pacer.pause().await;
    }

    Ok(candidates)
}

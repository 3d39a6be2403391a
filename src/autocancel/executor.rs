use log::{info, warn};

use super::matcher::Candidate;
use super::Pacer;
use crate::error::AutocancelError;
use crate::providers::circleci::links::workflow_reference;
use crate::providers::CiProvider;

/// Result of the cancel phase. Individual failures never abort the batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CancelOutcome {
    pub canceled: Vec<String>,
    pub failed: Vec<String>,
}

fn is_accepted(status: u16) -> bool {
    matches!(status, 200 | 202)
}

pub(super) async fn cancel_candidates<P>(
    provider: &P,
    candidates: &[Candidate],
    project_slug: &str,
    dry_run: bool,
    pacer: Pacer,
) -> CancelOutcome
where
    P: CiProvider + ?Sized,
{
    let mut outcome = CancelOutcome::default();

    for candidate in candidates {
        let workflow = &candidate.workflow;

        if dry_run {
            info!(
                "[dry-run] would cancel: wf={} name=\"{}\" (#{})",
                workflow.id, workflow.name, workflow.pipeline_number
            );
            continue;
        }

        let failure = match provider.cancel_workflow(&workflow.id).await {
            Ok(status) if is_accepted(status) => None,
            Ok(status) => Some(format!("HTTP {status}")),
            Err(e) => Some(e.to_string()),
        };

        match failure {
            None => {
                info!(
                    "[cancelled] wf={} name=\"{}\" (#{}) {}",
                    workflow.id,
                    workflow.name,
                    workflow.pipeline_number,
                    workflow_reference(project_slug, workflow.pipeline_number, &workflow.id)
                );
                outcome.canceled.push(workflow.id.clone());
            }
            Some(reason) => {
                warn!(
                    "{}",
                    AutocancelError::CancelFailure {
                        workflow_id: workflow.id.clone(),
                        reason,
                    }
                );
                outcome.failed.push(workflow.id.clone());
            }
        }

        pacer.pause().await;
    }

    outcome
}

//! Selection-and-cancellation engine.
//!
//! A run is strictly sequential: resolve the current context, scan older
//! pipelines on the branch, match workflows in them, then cancel. Matching
//! completes before the first cancel call is issued.

mod context;
mod executor;
mod matcher;
mod report;
mod scanner;

#[cfg(test)]
pub(crate) mod fake;

use std::collections::BTreeSet;
use std::time::Duration;

use log::{debug, warn};

use crate::error::Result;
use crate::output::PhaseProgress;
use crate::providers::{CiProvider, Workflow, WorkflowStatus};

pub use report::Report;

#[cfg(test)]
pub(crate) use context::RunContext;

pub const DEFAULT_MAX_PAGES: usize = 3;
pub const DEFAULT_SLEEP_MS: u64 = 120;
const MAX_WORKFLOW_PAGES: usize = 10;

/// Fully resolved inputs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocancelOptions {
    pub pipeline_id: String,
    pub workflow_id: String,
    pub project_slug: Option<String>,
    pub branch: Option<String>,
    pub workflow_name: Option<String>,
    /// Regex over workflow names; overrides `workflow_name` matching
    pub workflow_name_pattern: Option<String>,
    pub max_pages: usize,
    pub statuses: BTreeSet<WorkflowStatus>,
    pub dry_run: bool,
    /// Delay between remote calls
    pub pacing: Duration,
}

impl AutocancelOptions {
    pub fn new(pipeline_id: impl Into<String>, workflow_id: impl Into<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            workflow_id: workflow_id.into(),
            project_slug: None,
            branch: None,
            workflow_name: None,
            workflow_name_pattern: None,
            max_pages: DEFAULT_MAX_PAGES,
            statuses: WorkflowStatus::DEFAULT_TARGETS.into_iter().collect(),
            dry_run: false,
            pacing: Duration::from_millis(DEFAULT_SLEEP_MS),
        }
    }
}

/// Inter-call delay used to stay under the provider's rate limits.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self { delay }
    }

    #[cfg(test)]
    pub(crate) fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub(crate) async fn pause(self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Fetches every workflow of a pipeline, following continuation tokens.
async fn fetch_workflows<P>(provider: &P, pipeline_id: &str, pacer: Pacer) -> Result<Vec<Workflow>>
where
    P: CiProvider + ?Sized,
{
    let mut workflows = Vec::new();
    let mut page_token: Option<String> = None;

    for page_index in 0..MAX_WORKFLOW_PAGES {
        if page_index > 0 {
            pacer.pause().await;
        }

        let page = provider
            .list_workflows(pipeline_id, page_token.as_deref())
            .await?;
        workflows.extend(page.items);

        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => return Ok(workflows),
        }
    }

    warn!("Pipeline {pipeline_id} has more than {MAX_WORKFLOW_PAGES} pages of workflows, ignoring the rest");
    Ok(workflows)
}

/// Cancels redundant workflows of older pipelines on the current branch.
pub struct Autocancel<P> {
    provider: P,
    options: AutocancelOptions,
    show_progress: bool,
}

impl<P: CiProvider> Autocancel<P> {
    pub fn new(provider: P, options: AutocancelOptions) -> Self {
        Self {
            provider,
            options,
            show_progress: false,
        }
    }

    /// Draw phase spinners on stderr while running.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    #[cfg(test)]
    pub(crate) fn provider(&self) -> &P {
        &self.provider
    }

    /// Runs one scan-then-cancel pass and returns its report.
    ///
    /// # Errors
    ///
    /// Returns an error if the current context cannot be resolved or any
    /// pipeline or workflow listing fails. Failed cancel calls are logged and
    /// reported in `Report::failed_cancels` instead.
    pub async fn run(&self) -> Result<Report> {
        let options = &self.options;
        let pacer = Pacer::new(options.pacing);

        let resolved = context::resolve_context(&self.provider, options, pacer).await?;
        let current = resolved.run;

        debug!(
            "[context] slug={} branch={} wf=\"{}\" curNo={} pattern={}",
            current.project_slug,
            current.branch,
            current.workflow_name,
            current.pipeline_number,
            current
                .workflow_name_pattern
                .as_deref()
                .unwrap_or("(exact)")
        );

        let progress = PhaseProgress::start_phase_1(self.show_progress);

        let older = scanner::scan_history(&self.provider, &current, options.max_pages, pacer).await?;
        debug!("[scan] older pipelines found: {}", older.len());

        let progress = progress.finish_phase_1_start_phase_2(older.len());

        let candidates = matcher::match_workflows(
            &self.provider,
            &older,
            &resolved.matcher,
            &options.statuses,
            pacer,
        )
        .await?;

        let progress = progress.finish_phase_2_start_phase_3(candidates.len(), options.dry_run);

        let outcome = executor::cancel_candidates(
            &self.provider,
            &candidates,
            &current.project_slug,
            options.dry_run,
            pacer,
        )
        .await;

        progress.finish_phase_3(outcome.canceled.len(), options.dry_run);

        Ok(Report::build(
            current,
            older.len(),
            candidates.len(),
            outcome,
            options.dry_run,
        ))
    }
}

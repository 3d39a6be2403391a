//! In-memory `CiProvider` that records every call.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AutocancelError, Result};
use crate::providers::circleci::{PipelineSummary, PipelineVcs};
use crate::providers::{CiProvider, Pipeline, PipelinePage, Workflow, WorkflowPage, WorkflowStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetPipeline(String),
    ListPipelines {
        project_slug: String,
        branch: String,
        page_token: Option<String>,
    },
    ListWorkflows(String),
    Cancel(String),
}

pub fn wf(id: &str, name: &str, status: WorkflowStatus, pipeline_number: u64) -> Workflow {
    Workflow {
        id: id.to_string(),
        name: name.to_string(),
        status,
        pipeline_number,
    }
}

#[derive(Default)]
pub struct FakeProvider {
    pipelines: HashMap<String, Pipeline>,
    history: Vec<Vec<PipelineSummary>>,
    failing_history_pages: HashMap<usize, u16>,
    workflows: HashMap<String, Vec<Vec<Workflow>>>,
    cancel_statuses: HashMap<String, u16>,
    cancel_transport_errors: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeProvider {
    pub fn with_pipeline(
        mut self,
        id: &str,
        number: u64,
        project_slug: &str,
        branch: Option<&str>,
    ) -> Self {
        self.pipelines.insert(
            id.to_string(),
            Pipeline {
                id: id.to_string(),
                number,
                project_slug: project_slug.to_string(),
                vcs: PipelineVcs {
                    branch: branch.map(str::to_string),
                    tag: None,
                },
            },
        );
        self
    }

    /// Pipeline history, one inner vec per page. Page N (1-based) is reached
    /// with token `page-N`; the last page carries no token.
    pub fn with_history(mut self, pages: Vec<Vec<(&str, u64)>>) -> Self {
        self.history = pages
            .into_iter()
            .map(|page| {
                page.into_iter()
                    .map(|(id, number)| PipelineSummary {
                        id: id.to_string(),
                        number,
                        state: "created".to_string(),
                        created_at: None,
                    })
                    .collect()
            })
            .collect();
        self
    }

    /// Makes the 1-based history page `page` fail with `status`.
    pub fn failing_history_page(mut self, page: usize, status: u16) -> Self {
        self.failing_history_pages.insert(page, status);
        self
    }

    pub fn with_workflows(self, pipeline_id: &str, workflows: Vec<Workflow>) -> Self {
        self.with_workflow_pages(pipeline_id, vec![workflows])
    }

    pub fn with_workflow_pages(mut self, pipeline_id: &str, pages: Vec<Vec<Workflow>>) -> Self {
        self.workflows.insert(pipeline_id.to_string(), pages);
        self
    }

    pub fn with_cancel_status(mut self, workflow_id: &str, status: u16) -> Self {
        self.cancel_statuses.insert(workflow_id.to_string(), status);
        self
    }

    pub fn with_cancel_transport_error(mut self, workflow_id: &str) -> Self {
        self.cancel_transport_errors.insert(workflow_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn cancel_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Cancel(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }
}

fn page_index(token: Option<&str>, prefix: &str) -> usize {
    token
        .and_then(|t| t.strip_prefix(prefix))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(1)
}

fn next_token(page: usize, total: usize, prefix: &str) -> Option<String> {
    (page < total).then(|| format!("{prefix}{}", page + 1))
}

fn not_found(operation: &str) -> AutocancelError {
    AutocancelError::HttpError {
        operation: operation.to_string(),
        status: 404,
        body: "Not Found".to_string(),
    }
}

#[async_trait]
impl CiProvider for FakeProvider {
    async fn get_pipeline(&self, pipeline_id: &str) -> Result<Pipeline> {
        self.record(Call::GetPipeline(pipeline_id.to_string()));
        self.pipelines
            .get(pipeline_id)
            .cloned()
            .ok_or_else(|| not_found("GET pipeline"))
    }

    async fn list_pipelines(
        &self,
        project_slug: &str,
        branch: &str,
        page_token: Option<&str>,
    ) -> Result<PipelinePage> {
        self.record(Call::ListPipelines {
            project_slug: project_slug.to_string(),
            branch: branch.to_string(),
            page_token: page_token.map(str::to_string),
        });

        let page = page_index(page_token, "page-");
        if let Some(status) = self.failing_history_pages.get(&page) {
            return Err(AutocancelError::HttpError {
                operation: "LIST pipelines".to_string(),
                status: *status,
                body: "failure".to_string(),
            });
        }

        Ok(PipelinePage {
            items: self.history.get(page - 1).cloned().unwrap_or_default(),
            next_page_token: next_token(page, self.history.len(), "page-"),
        })
    }

    async fn list_workflows(
        &self,
        pipeline_id: &str,
        page_token: Option<&str>,
    ) -> Result<WorkflowPage> {
        self.record(Call::ListWorkflows(pipeline_id.to_string()));

        let pages = self
            .workflows
            .get(pipeline_id)
            .ok_or_else(|| not_found("LIST workflows"))?;
        let page = page_index(page_token, "wf-page-");

        Ok(WorkflowPage {
            items: pages.get(page - 1).cloned().unwrap_or_default(),
            next_page_token: next_token(page, pages.len(), "wf-page-"),
        })
    }

    async fn cancel_workflow(&self, workflow_id: &str) -> Result<u16> {
        self.record(Call::Cancel(workflow_id.to_string()));

        if self.cancel_transport_errors.contains(workflow_id) {
            return Err(AutocancelError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )));
        }

        Ok(self.cancel_statuses.get(workflow_id).copied().unwrap_or(202))
    }
}

pub mod circleci;

use async_trait::async_trait;

use crate::error::Result;

pub use circleci::{CircleCiClient, Pipeline, PipelinePage, Workflow, WorkflowPage, WorkflowStatus};

/// Remote operations the autocancel engine needs from a CI provider.
///
/// Implementations carry no business logic. Read calls fail with
/// `AutocancelError::HttpError` on a non-success status; `cancel_workflow`
/// hands back the raw status code and only fails on transport errors.
#[async_trait]
pub trait CiProvider: Send + Sync {
    async fn get_pipeline(&self, pipeline_id: &str) -> Result<Pipeline>;

    async fn list_pipelines(
        &self,
        project_slug: &str,
        branch: &str,
        page_token: Option<&str>,
    ) -> Result<PipelinePage>;

    async fn list_workflows(
        &self,
        pipeline_id: &str,
        page_token: Option<&str>,
    ) -> Result<WorkflowPage>;

    async fn cancel_workflow(&self, workflow_id: &str) -> Result<u16>;
}

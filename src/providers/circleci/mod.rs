mod client;
pub mod links;
mod types;

pub use client::{CircleCiClient, DEFAULT_API_BASE};
pub use types::{Pipeline, PipelinePage, PipelineSummary, Workflow, WorkflowPage, WorkflowStatus};

#[cfg(test)]
pub use types::PipelineVcs;

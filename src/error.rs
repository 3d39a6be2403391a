use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutocancelError {
    #[error(
        "CircleCI token not provided. Pass --token or set CIRCLECI_TOKEN / CIRCLE_TOKEN / CIRCLECI_PERSONAL_TOKEN."
    )]
    MissingCredential,

    #[error("Missing {0}")]
    MissingContext(String),

    #[error(
        "Current build does not have a branch (likely a tag build). Provide --branch to override."
    )]
    UnresolvedBranch,

    #[error("Current workflow {workflow_id} not found in pipeline {pipeline_id}")]
    WorkflowNotFound {
        workflow_id: String,
        pipeline_id: String,
    },

    #[error("{operation} -> HTTP {status}: {body}")]
    HttpError {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Cancel failed: wf={workflow_id} -> {reason}")]
    CancelFailure { workflow_id: String, reason: String },

    #[error("Invalid workflow name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AutocancelError>;

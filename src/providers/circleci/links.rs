/// Builds a clickable web URL for a workflow in the CircleCI app.
///
/// Only slugs of the form `<vcs>/<org>/<repo>` can be mapped to a web URL;
/// the short VCS prefixes used by the API (`gh`, `bb`) are expanded to the
/// names the web app uses.
///
/// # Arguments
///
/// * `project_slug` - Project slug (e.g., "gh/org/repo")
/// * `pipeline_number` - Number of the pipeline owning the workflow
/// * `workflow_id` - Workflow identifier
///
/// # Returns
///
/// URL such as <https://app.circleci.com/pipelines/github/org/repo/41/workflows/wf-1>,
/// or `None` when the slug does not have exactly three non-empty segments.
pub fn workflow_url(project_slug: &str, pipeline_number: u64, workflow_id: &str) -> Option<String> {
    let segments: Vec<&str> = project_slug.split('/').collect();
    let [vcs, org, repo] = segments.as_slice() else {
        return None;
    };

    if vcs.is_empty() || org.is_empty() || repo.is_empty() {
        return None;
    }

    let vcs = match *vcs {
        "gh" | "github" => "github",
        "bb" | "bitbucket" => "bitbucket",
        other => other,
    };

    Some(format!(
        "https://app.circleci.com/pipelines/{vcs}/{org}/{repo}/{pipeline_number}/workflows/{workflow_id}"
    ))
}

/// Human-navigable reference for log records, falling back to `workflow:<id>`.
pub fn workflow_reference(project_slug: &str, pipeline_number: u64, workflow_id: &str) -> String {
    workflow_url(project_slug, pipeline_number, workflow_id)
        .unwrap_or_else(|| format!("workflow:{workflow_id}"))
}

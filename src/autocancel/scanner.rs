use log::debug;

use super::context::RunContext;
use super::Pacer;
use crate::error::Result;
use crate::providers::circleci::PipelineSummary;
use crate::providers::CiProvider;

/// Walks the branch's pipeline history and collects the ids of older pipelines.
///
/// Stops at the first page without a continuation token or after `max_pages`
/// pages, whichever comes first. Any page failure aborts the scan.
pub(super) async fn scan_history<P>(
    provider: &P,
    context: &RunContext,
    max_pages: usize,
    pacer: Pacer,
) -> Result<Vec<String>>
where
    P: CiProvider + ?Sized,
{
    let mut older = Vec::new();
    let mut page_token: Option<String> = None;

    for page_index in 0..max_pages {
        if page_index > 0 {
            pacer.pause().await;
        }

        let page = provider
            .list_pipelines(&context.project_slug, &context.branch, page_token.as_deref())
            .await?;

        let before = older.len();
        older.extend(
            page.items
                .into_iter()
                .filter(|p| is_older(context, p))
                .map(|p| p.id),
        );
        debug!(
            "[scan] page {}: {} older pipelines",
            page_index + 1,
            older.len() - before
        );

        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(older)
}

fn is_older(context: &RunContext, pipeline: &PipelineSummary) -> bool {
    pipeline.id != context.pipeline_id && pipeline.number < context.pipeline_number
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocancel::fake::{Call, FakeProvider};
    use crate::error::AutocancelError;
    use std::time::Duration;
    use tokio::time::Instant;

    fn context(pipeline_number: u64) -> RunContext {
        RunContext {
            project_slug: "gh/org/repo".to_string(),
            branch: "main".to_string(),
            workflow_name: "build".to_string(),
            workflow_name_pattern: None,
            pipeline_id: "pipe-42".to_string(),
            pipeline_number,
        }
    }

    fn list_calls(provider: &FakeProvider) -> Vec<Option<String>> {
        provider
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ListPipelines {
                    project_slug,
                    branch,
                    page_token,
                } => {
                    assert_eq!(project_slug, "gh/org/repo");
                    assert_eq!(branch, "main");
                    Some(page_token)
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_only_strictly_older_pipelines_are_kept() {
        let provider = FakeProvider::default().with_history(vec![vec![
            ("pipe-43", 43),
            ("pipe-42", 42),
            ("pipe-41", 41),
            ("pipe-39", 39),
        ]]);

        let older = scan_history(
            &provider,
            &context(42),
            3,
            Pacer::disabled(),
        )
        .await
        .unwrap();

        assert_eq!(older, vec!["pipe-41", "pipe-39"]);
    }

    #[tokio::test]
    async fn test_stops_at_page_cap() {
        let provider = FakeProvider::default().with_history(vec![
            vec![("pipe-41", 41)],
            vec![("pipe-40", 40)],
            vec![("pipe-39", 39)],
            vec![("pipe-38", 38)],
        ]);

        let older = scan_history(
            &provider,
            &context(42),
            2,
            Pacer::disabled(),
        )
        .await
        .unwrap();

        assert_eq!(older, vec!["pipe-41", "pipe-40"]);
        assert_eq!(list_calls(&provider), vec![None, Some("page-2".to_string())]);
    }

    #[tokio::test]
    async fn test_stops_when_token_missing() {
        let provider = FakeProvider::default()
            .with_history(vec![vec![("pipe-41", 41)], vec![("pipe-40", 40)]]);

        let older = scan_history(
            &provider,
            &context(42),
            5,
            Pacer::disabled(),
        )
        .await
        .unwrap();

        assert_eq!(older, vec!["pipe-41", "pipe-40"]);
        assert_eq!(list_calls(&provider).len(), 2);
    }

    #[tokio::test]
    async fn test_newer_pipelines_on_later_pages_are_skipped() {
        let provider = FakeProvider::default().with_history(vec![
            vec![("pipe-50", 50), ("pipe-42", 42)],
            vec![("pipe-44", 44), ("pipe-41", 41)],
        ]);

        let older = scan_history(&provider, &context(42), 3, Pacer::disabled())
            .await
            .unwrap();

        assert_eq!(older, vec!["pipe-41"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_between_pages_only() {
        let provider = FakeProvider::default().with_history(vec![
            vec![("pipe-41", 41)],
            vec![("pipe-40", 40)],
            vec![("pipe-39", 39)],
        ]);
        let pacing = Duration::from_millis(120);

        let started = Instant::now();
        scan_history(&provider, &context(42), 5, Pacer::new(pacing))
            .await
            .unwrap();

        assert_eq!(started.elapsed(), pacing * 2);
    }

    #[tokio::test]
    async fn test_page_failure_aborts_scan() {
        let provider = FakeProvider::default()
            .with_history(vec![vec![("pipe-41", 41)], vec![("pipe-40", 40)]])
            .failing_history_page(2, 503);

        let err = scan_history(
            &provider,
            &context(42),
            3,
            Pacer::disabled(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AutocancelError::HttpError { status: 503, .. }));
    }
}

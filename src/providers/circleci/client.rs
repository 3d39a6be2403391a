use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{Pipeline, PipelinePage, WorkflowPage};
use crate::auth::Token;
use crate::error::{AutocancelError, Result};
use crate::providers::CiProvider;

pub const DEFAULT_API_BASE: &str = "https://circleci.com/api/v2";

const TOKEN_HEADER: &str = "Circle-Token";
const PAGE_TOKEN_PARAM: &str = "page-token";
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_SECONDS: u64 = 2;

/// Thin REST client for the CircleCI v2 API.
pub struct CircleCiClient {
    client: Client,
    api_url: Url,
    token: Token,
    retry_delay: Duration,
}

impl CircleCiClient {
    /// Creates a client rooted at `base_url` (e.g. <https://circleci.com/api/v2>).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL is
    /// not a valid hierarchical URL.
    pub fn new(base_url: &str, token: Token) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("circleci-autocancel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AutocancelError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)
            .map_err(|e| AutocancelError::Config(format!("Invalid API base URL: {e}")))?;

        if api_url.cannot_be_a_base() {
            return Err(AutocancelError::Config(format!(
                "Invalid API base URL: {base_url}"
            )));
        }

        Ok(Self {
            client,
            api_url,
            token,
            retry_delay: Duration::from_secs(RETRY_DELAY_SECONDS),
        })
    }

    /// Overrides the back-off used when a read call is rate limited without a
    /// `Retry-After` header.
    #[cfg(test)]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(TOKEN_HEADER, self.token.as_str())
            .header(ACCEPT, "application/json")
    }

    /// Appends path segments to the API base, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // cannot_be_a_base() was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Executes a GET and decodes the JSON body, retrying on rate limits.
    async fn get_json<T>(&self, operation: &str, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut retry_count = 0;
        loop {
            debug!("GET {url}");
            let response = self
                .auth_request(self.client.get(url.clone()))
                .send()
                .await?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && retry_count < MAX_RETRIES {
                let delay = retry_after(&response).unwrap_or(self.retry_delay);
                warn!(
                    "{operation} rate limited, retrying in {}ms ({}/{MAX_RETRIES})...",
                    delay.as_millis(),
                    retry_count + 1
                );
                tokio::time::sleep(delay).await;
                retry_count += 1;
                continue;
            }

            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read error response".to_string());
                return Err(AutocancelError::HttpError {
                    operation: operation.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }

            let body = response.text().await?;
            return Ok(serde_json::from_str(&body)?);
        }
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl CiProvider for CircleCiClient {
    async fn get_pipeline(&self, pipeline_id: &str) -> Result<Pipeline> {
        let url = self.endpoint(&["pipeline", pipeline_id]);
        self.get_json(&format!("GET pipeline {pipeline_id}"), url)
            .await
    }

    async fn list_pipelines(
        &self,
        project_slug: &str,
        branch: &str,
        page_token: Option<&str>,
    ) -> Result<PipelinePage> {
        let mut url = self.endpoint(&["project", project_slug, "pipeline"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("branch", branch);
            if let Some(token) = page_token {
                query.append_pair(PAGE_TOKEN_PARAM, token);
            }
        }
        self.get_json("LIST pipelines", url).await
    }

    async fn list_workflows(
        &self,
        pipeline_id: &str,
        page_token: Option<&str>,
    ) -> Result<WorkflowPage> {
        let mut url = self.endpoint(&["pipeline", pipeline_id, "workflow"]);
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair(PAGE_TOKEN_PARAM, token);
        }
        self.get_json(&format!("LIST workflows of pipeline {pipeline_id}"), url)
            .await
    }

    async fn cancel_workflow(&self, workflow_id: &str) -> Result<u16> {
        let url = self.endpoint(&["workflow", workflow_id, "cancel"]);
        debug!("POST {url}");
        let response = self.auth_request(self.client.post(url)).send().await?;
        Ok(response.status().as_u16())
    }
}

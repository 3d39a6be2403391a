use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::time::Duration;

use crate::auth::Token;
use crate::autocancel::{AutocancelOptions, DEFAULT_MAX_PAGES, DEFAULT_SLEEP_MS};
use crate::error::AutocancelError;
use crate::providers::circleci::DEFAULT_API_BASE;
use crate::providers::WorkflowStatus;

const TOKEN_VARS: [&str; 3] = ["CIRCLECI_TOKEN", "CIRCLE_TOKEN", "CIRCLECI_PERSONAL_TOKEN"];
const PIPELINE_ID_VAR: &str = "CIRCLE_PIPELINE_ID";
const WORKFLOW_ID_VAR: &str = "CIRCLE_WORKFLOW_ID";

/// Configuration file structure.
///
/// Lets a project pin defaults (API base, statuses, pacing) in the repository
/// instead of repeating flags in every CI job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// CircleCI personal token, lowest-priority fallback
    pub token: Option<String>,

    /// CircleCI API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// How many pages of pipelines to scan
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Workflow statuses eligible for cancellation
    #[serde(default = "default_statuses")]
    pub statuses: Vec<WorkflowStatus>,

    /// Delay between API calls in milliseconds
    #[serde(default = "default_sleep_ms")]
    pub sleep_ms: u64,

    /// Regex matching workflow names, overrides exact-name matching
    pub workflow_name_pattern: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            api_base: default_api_base(),
            max_pages: default_max_pages(),
            statuses: default_statuses(),
            sleep_ms: default_sleep_ms(),
            workflow_name_pattern: None,
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_statuses() -> Vec<WorkflowStatus> {
    WorkflowStatus::DEFAULT_TARGETS.to_vec()
}

fn default_sleep_ms() -> u64 {
    DEFAULT_SLEEP_MS
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path (must exist)
    /// 2. ./autocancel.toml
    /// 3. ./autocancel.json
    /// 4. ./autocancel.yaml
    /// 5. ./autocancel.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "autocancel.toml",
            "autocancel.json",
            "autocancel.yaml",
            "autocancel.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}

/// Source of environment variables, injectable for tests.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Values given explicitly on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub pipeline_id: Option<String>,
    pub workflow_id: Option<String>,
    pub project_slug: Option<String>,
    pub branch: Option<String>,
    pub workflow_name: Option<String>,
    pub workflow_name_pattern: Option<String>,
    pub api_base: Option<String>,
    pub max_pages: Option<usize>,
    pub statuses: Option<Vec<WorkflowStatus>>,
    pub sleep_ms: Option<u64>,
    pub dry_run: bool,
}

/// Everything a run needs, after layering CLI > environment > file > defaults.
#[derive(Debug)]
pub struct Settings {
    pub token: Token,
    pub api_base: String,
    pub options: AutocancelOptions,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Settings {
    /// Resolves the run settings.
    ///
    /// The credential is resolved first, so a missing token fails before
    /// anything else is looked at.
    pub fn resolve(
        overrides: Overrides,
        file: &Config,
        env: &dyn EnvSource,
    ) -> Result<Self, AutocancelError> {
        let token = non_blank(overrides.token)
            .or_else(|| TOKEN_VARS.iter().find_map(|key| non_blank(env.var(key))))
            .or_else(|| non_blank(file.token.clone()))
            .map(Token::from)
            .ok_or(AutocancelError::MissingCredential)?;

        let pipeline_id = non_blank(overrides.pipeline_id)
            .or_else(|| non_blank(env.var(PIPELINE_ID_VAR)))
            .ok_or_else(|| {
                AutocancelError::MissingContext(format!(
                    "pipeline id. Provide --pipeline-id or set {PIPELINE_ID_VAR}."
                ))
            })?;

        let workflow_id = non_blank(overrides.workflow_id)
            .or_else(|| non_blank(env.var(WORKFLOW_ID_VAR)))
            .ok_or_else(|| {
                AutocancelError::MissingContext(format!(
                    "workflow id. Provide --workflow-id or set {WORKFLOW_ID_VAR}."
                ))
            })?;

        let max_pages = overrides.max_pages.unwrap_or(file.max_pages);
        if max_pages == 0 {
            return Err(AutocancelError::Config(
                "max-pages must be at least 1".to_string(),
            ));
        }

        let statuses: BTreeSet<WorkflowStatus> = overrides
            .statuses
            .unwrap_or_else(|| file.statuses.clone())
            .into_iter()
            .collect();
        if statuses.is_empty() {
            return Err(AutocancelError::Config(
                "at least one workflow status must be targeted".to_string(),
            ));
        }
        if statuses.contains(&WorkflowStatus::Unknown) {
            return Err(AutocancelError::Config(
                "statuses contain an unrecognized workflow status".to_string(),
            ));
        }

        let api_base = non_blank(overrides.api_base).unwrap_or_else(|| file.api_base.clone());
        let sleep_ms = overrides.sleep_ms.unwrap_or(file.sleep_ms);

        let mut options = AutocancelOptions::new(pipeline_id, workflow_id);
        options.project_slug = non_blank(overrides.project_slug);
        options.branch = non_blank(overrides.branch);
        options.workflow_name = non_blank(overrides.workflow_name);
        options.workflow_name_pattern = non_blank(overrides.workflow_name_pattern)
            .or_else(|| non_blank(file.workflow_name_pattern.clone()));
        options.max_pages = max_pages;
        options.statuses = statuses;
        options.dry_run = overrides.dry_run;
        options.pacing = Duration::from_millis(sleep_ms);

        Ok(Self {
            token,
            api_base,
            options,
        })
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use crate::autocancel::Autocancel;
use crate::config::{Config, Overrides, ProcessEnv, Settings};
use crate::output;
use crate::providers::{CircleCiClient, WorkflowStatus};

#[derive(Parser)]
#[command(name = "circleci-autocancel")]
#[command(
    author,
    version,
    about = "Cancel redundant CircleCI workflows on the same branch (including default branch)",
    long_about = None
)]
pub struct Cli {
    /// CircleCI personal token (fallback: env CIRCLECI_TOKEN/CIRCLE_TOKEN/CIRCLECI_PERSONAL_TOKEN)
    #[arg(short, long)]
    token: Option<String>,

    /// Current pipeline id (default: env CIRCLE_PIPELINE_ID)
    #[arg(short, long)]
    pipeline_id: Option<String>,

    /// Current workflow id (default: env CIRCLE_WORKFLOW_ID)
    #[arg(short, long)]
    workflow_id: Option<String>,

    /// Project slug (e.g. gh/org/repo). If omitted, resolved from pipeline.
    #[arg(long)]
    project_slug: Option<String>,

    /// Branch name. If omitted, resolved from pipeline.
    #[arg(short, long)]
    branch: Option<String>,

    /// Exact workflow name to match (default: current workflow name)
    #[arg(long)]
    workflow_name: Option<String>,

    /// Regex to match workflow names (overrides --workflow-name)
    #[arg(long)]
    workflow_name_pattern: Option<String>,

    /// How many pages of pipelines to scan [default: 3]
    #[arg(long)]
    max_pages: Option<usize>,

    /// Statuses to cancel, comma separated [default: running,on_hold]
    #[arg(long, value_delimiter = ',')]
    statuses: Option<Vec<WorkflowStatus>>,

    /// CircleCI API base [default: https://circleci.com/api/v2]
    #[arg(long)]
    api_base: Option<String>,

    /// Sleep ms between API calls [default: 120]
    #[arg(long)]
    sleep_ms: Option<u64>,

    /// Do not cancel, just log
    #[arg(short = 'n', long, default_value_t = false)]
    dry_run: bool,

    /// Verbose logs, summary table and JSON report
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Config file (default: ./autocancel.{toml,json,yaml,yml} if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Also write the JSON report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            token: self.token.clone(),
            pipeline_id: self.pipeline_id.clone(),
            workflow_id: self.workflow_id.clone(),
            project_slug: self.project_slug.clone(),
            branch: self.branch.clone(),
            workflow_name: self.workflow_name.clone(),
            workflow_name_pattern: self.workflow_name_pattern.clone(),
            api_base: self.api_base.clone(),
            max_pages: self.max_pages,
            statuses: self.statuses.clone(),
            sleep_ms: self.sleep_ms,
            dry_run: self.dry_run,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let file = Config::load(self.config.as_deref())?;
        let settings = Settings::resolve(self.overrides(), &file, &ProcessEnv)?;

        info!(
            "Scanning for redundant workflows{}",
            if settings.options.dry_run { " (dry-run)" } else { "" }
        );

        let client = CircleCiClient::new(&settings.api_base, settings.token)?;
        let show_progress = !self.json && console::Term::stderr().is_term();

        let report = Autocancel::new(client, settings.options)
            .with_progress(show_progress)
            .run()
            .await?;

        let json_output = if self.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, &json_output)
                .with_context(|| format!("Failed to write report: {}", output_path.display()))?;
            info!("Report written to: {}", output_path.display());
        }

        if self.verbose {
            output::print_summary(&report);
        }

        if self.json || self.verbose {
            println!("{json_output}");
        } else {
            println!("{}", output::summary_line(&report));
        }

        Ok(())
    }
}

mod auth;
mod autocancel;
mod cli;
mod config;
mod error;
mod output;
mod providers;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    output::print_banner();

    info!("Starting circleci-autocancel");
    cli.execute().await?;

    Ok(())
}

/// `RUST_LOG` wins; otherwise `--verbose` turns on decision logging.
fn init_logger(verbose: bool) {
    let default_filter = if verbose {
        "info,circleci_autocancel=debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

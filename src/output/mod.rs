mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::PhaseProgress;
use styling::{banner, muted};
pub use summary::{print_summary, summary_line};

/// Prints the banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        banner("⛔ circleci-autocancel"),
        muted(env!("CARGO_PKG_VERSION")),
        muted("Cancel redundant CircleCI workflows")
    );
}

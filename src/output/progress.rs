use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{done, pending, section};

/// Spinners for the scan, match and cancel phases of a run
pub struct PhaseProgress {
    pb: ProgressBar,
    visible: bool,
}

impl PhaseProgress {
    pub fn start_phase_1(visible: bool) -> Self {
        if visible {
            eprintln!("{}", section("⚙️ ", "Phases"));
        }
        let pb = create_spinner(
            visible,
            pending("Phase 1/3: Scanning pipeline history").to_string(),
        );
        Self { pb, visible }
    }

    pub fn finish_phase_1_start_phase_2(self, pipeline_count: usize) -> Self {
        self.pb.finish_with_message(
            done(format!("Phase 1/3: Found {pipeline_count} older pipelines ✓")).to_string(),
        );
        let pb = create_spinner(
            self.visible,
            pending("Phase 2/3: Matching workflows").to_string(),
        );
        Self { pb, ..self }
    }

    pub fn finish_phase_2_start_phase_3(self, candidate_count: usize, dry_run: bool) -> Self {
        self.pb.finish_with_message(
            done(format!("Phase 2/3: Matched {candidate_count} workflows ✓")).to_string(),
        );
        let label = if dry_run {
            "Phase 3/3: Listing workflows (dry-run)"
        } else {
            "Phase 3/3: Canceling workflows"
        };
        let pb = create_spinner(self.visible, pending(label).to_string());
        Self { pb, ..self }
    }

    pub fn finish_phase_3(self, canceled_count: usize, dry_run: bool) {
        let message = if dry_run {
            "Phase 3/3: Dry-run complete, nothing canceled ✓".to_string()
        } else {
            format!("Phase 3/3: Canceled {canceled_count} workflows ✓")
        };
        self.pb
            .finish_with_message(done(message).to_string());
        if self.visible {
            eprintln!();
        }
    }
}

fn create_spinner(visible: bool, message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if !visible {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }

    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

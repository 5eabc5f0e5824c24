//! Progress reporting for long-running phases
//!
//! Orchestration reports through the [`ProgressReporter`] trait so tests and non-interactive
//! callers can run silently.

use indicatif::{ProgressBar, ProgressStyle};

/// Progress sink for a counted phase such as staging
pub trait ProgressReporter {
    /// Start a phase with `total` items
    fn start(&mut self, phase: &str, total: u64);

    /// One item done
    fn advance(&mut self, item: &str);

    /// Phase completed
    fn finish(&mut self);

    /// Phase aborted on error
    fn abandon(&mut self);
}

/// Progress bar on stderr; hidden when stderr is not a terminal
#[derive(Default)]
pub struct InteractiveProgress {
    bar: Option<ProgressBar>,
}

impl InteractiveProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for InteractiveProgress {
    fn start(&mut self, phase: &str, total: u64) {
        let style = ProgressStyle::default_bar()
            .template("{prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(total);
        bar.set_style(style);
        bar.set_prefix(phase.to_string());
        self.bar = Some(bar);
    }

    fn advance(&mut self, item: &str) {
        if let Some(ref bar) = self.bar {
            // Keep the tail of long paths
            let display = if item.chars().count() > 50 {
                let tail: String = item
                    .chars()
                    .rev()
                    .take(47)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                format!("...{tail}")
            } else {
                item.to_string()
            };
            bar.set_message(display);
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn abandon(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}

/// Reporter that shows nothing
#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn start(&mut self, _phase: &str, _total: u64) {}

    fn advance(&mut self, _item: &str) {}

    fn finish(&mut self) {}

    fn abandon(&mut self) {}
}

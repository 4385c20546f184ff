//! Spinner shown while a mount unit starts or stops.

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const RUNNING_TEMPLATE: &str = "  {spinner:.cyan} {msg}";
const DONE_TEMPLATE: &str = "  {prefix} {msg}";

#[must_use]
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(TICKS)
            .template(RUNNING_TEMPLATE)
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Replaces the spinner line with `✓ message` or `✗ error`.
pub fn finish(pb: &ProgressBar, outcome: Result<&str, &str>) {
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(DONE_TEMPLATE)
            .expect("valid template"),
    );
    match outcome {
        Ok(msg) => {
            pb.set_prefix("✓");
            pb.finish_with_message(msg.to_string());
        }
        Err(msg) => {
            pb.set_prefix("✗");
            pb.abandon_with_message(msg.to_string());
        }
    }
}

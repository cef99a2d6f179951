//! Progress reporting for the blocking stages (download, decode, transform)
//!
//! Spinners are hidden when progress output is disabled, so callers can
//! always drive them unconditionally.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Template shared by all pipeline spinners
pub const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {msg}";

/// Create a spinner for an operation without a known length
///
/// # Arguments
/// * `message` - Message displayed next to the spinner
/// * `enabled` - When false, a hidden spinner is returned
#[must_use]
pub fn create_spinner(message: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a spinner, leaving `message` on screen if given
pub fn finish_spinner(pb: &ProgressBar, message: Option<&str>) {
    match message {
        Some(msg) => pb.finish_with_message(msg.to_string()),
        None => pb.finish_and_clear(),
    }
}

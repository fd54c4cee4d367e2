//! Progress indicator for the fleet CLI.
//!
//! Responsibilities:
//! - Show an indefinite spinner whose message follows the report status.
//! - Ensure ALL progress output is written to STDERR (never stdout), so machine-readable
//!   command output (json/table/csv) is not contaminated.
//! - Allow global suppression via a caller-provided `enabled` boolean (driven by `--quiet`).
//!
//! Non-responsibilities:
//! - This module does not decide *when* progress should be shown; callers do.
//! - This module does not print command results; stdout remains reserved for results.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// An indefinite spinner for network-bound steps (cache load, report run).
///
/// Always draws to STDERR; no-op when disabled.
pub(crate) struct Spinner {
    pb: Option<ProgressBar>,
}

impl Spinner {
    /// Create a new spinner.
    ///
    /// `enabled` should be `!quiet`.
    pub(crate) fn new(enabled: bool, label: impl Into<String>) -> Self {
        if !enabled {
            return Self { pb: None };
        }

        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(label.into());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb: Some(pb) }
    }

    /// Replace the spinner message.
    pub(crate) fn set_message(&self, message: impl Into<String>) {
        if let Some(pb) = &self.pb {
            pb.set_message(message.into());
        }
    }

    /// Finish the spinner, leaving `message` on STDERR.
    pub(crate) fn finish_with(&self, message: impl Into<String>) {
        if let Some(pb) = &self.pb {
            pb.finish_with_message(message.into());
        }
    }
}

impl Spinner {
    /// Remove the spinner line without leaving a message.
    pub(crate) fn clear(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        // Clear an unfinished spinner so it does not interleave with error output.
        if let Some(pb) = &self.pb
            && !pb.is_finished()
        {
            pb.finish_and_clear();
        }
    }
}

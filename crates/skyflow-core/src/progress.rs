//! Advisory progress reporting for long operations.
//!
//! Reporters are non-authoritative: they may lose updates, and a reporter
//! failure is swallowed and logged — it never aborts the wrapped operation.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

/// Best-effort sink for progress text.
pub trait Progress: Send + Sync {
    fn update(&self, message: &str);
    fn finish(&self, message: &str);
}

/// Terminal spinner, rendered on stderr.
pub struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        match ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            Ok(style) => bar.set_style(style),
            // Advisory only: fall back to the default style.
            Err(err) => debug!("spinner template rejected: {err}"),
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(message.to_string());
        Self { bar }
    }
}

impl Progress for SpinnerProgress {
    fn update(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Drop for SpinnerProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

/// Reporter for machine-readable output modes and tests.
pub struct SilentProgress;

impl Progress for SilentProgress {
    fn update(&self, _message: &str) {}

    fn finish(&self, _message: &str) {}
}

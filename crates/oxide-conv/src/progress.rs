//! Progress reporting through `tracing`.

use tracing::{debug, info};

use oxide_conv_core::progress::ProgressSink;

/// Logs progress events; never blocks the caller.
#[derive(Debug, Clone, Default)]
pub struct LogProgress {
    label: String,
    total: usize,
    done: usize,
}

impl LogProgress {
    /// Creates a sink whose events carry `label`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            total: 0,
            done: 0,
        }
    }

    /// Steps reported so far.
    #[must_use]
    pub const fn done(&self) -> usize {
        self.done
    }

    /// Steps announced by the last `start_progress`.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }
}

impl ProgressSink for LogProgress {
    fn start_progress(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        info!(task = %self.label, total, "started");
    }

    fn advance(&mut self) {
        self.done += 1;
        debug!(task = %self.label, done = self.done, total = self.total, "progress");
    }

    fn finish(&mut self, message: &str) {
        info!(task = %self.label, done = self.done, "{message}");
    }
}

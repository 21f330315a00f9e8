//! Progress reporting side channel.

/// Receives progress of long-running builds.
///
/// Purely informational: implementations must not fail and must not
/// block the work they report on.
pub trait ProgressSink {
    /// Announces how many steps follow.
    fn start_progress(&mut self, total: usize);

    /// Marks one step as done.
    fn advance(&mut self);

    /// Ends the report.
    fn finish(&mut self, message: &str);
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn start_progress(&mut self, _total: usize) {}

    fn advance(&mut self) {}

    fn finish(&mut self, _message: &str) {}
}

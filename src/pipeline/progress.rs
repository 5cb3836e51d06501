//! Advisory progress reporting
//!
//! Checkpoints are purely informational: a sink may render them, log them,
//! or drop them, but they never influence control flow.

/// Receives percentage checkpoints at stage boundaries.
pub trait Progress: Send + Sync {
    fn report(&self, fraction: f32, stage: &str);
}

/// Sink that drops every checkpoint.
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&self, _fraction: f32, _stage: &str) {}
}

/// Sink that forwards checkpoints to the tracing subscriber.
pub struct LogProgress;

impl Progress for LogProgress {
    fn report(&self, fraction: f32, stage: &str) {
        tracing::info!("[{:>3.0}%] {stage}", fraction * 100.0);
    }
}

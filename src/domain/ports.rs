use std::time::Duration;

/// Resolved webhook endpoints and the shared per-request timeout.
pub trait EndpointProvider: Send + Sync {
    fn search_url(&self) -> &str;
    fn update_url(&self) -> &str;
    fn email_draft_url(&self) -> &str;
    fn email_send_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
}

/// Incremental progress surface for batch submissions.
///
/// Called after every attempt, success or failure, with the number of
/// completed rows, the batch total, and the label of the row just attempted.
/// There is exactly one writer (the submitting loop) per batch.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize, label: &str);
}

/// Default sink: logs `completed/total label` through tracing.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_progress(&self, completed: usize, total: usize, label: &str) {
        tracing::info!("{}/{} {}", completed, total, label);
    }
}

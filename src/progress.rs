//! Progress-callback trait for per-job batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::options::RenderOptionsBuilder::progress_callback`] to receive
//! real-time events as the driver works through a batch.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a channel, a WebSocket, a database record, or a
//! terminal progress bar without the library knowing anything about how
//! the host application communicates. The trait is `Send + Sync` so it
//! works correctly when jobs are converted concurrently.

use std::sync::Arc;

/// Called by the batch driver as it processes each job.
///
/// All methods have default no-op implementations so callers only
/// override what they care about.
///
/// # Thread safety
///
/// With `concurrency > 1`, `on_job_start`, `on_job_complete`, and
/// `on_job_error` may be called concurrently from different tasks.
/// Implementations must protect shared mutable state accordingly.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any job is submitted to the engine.
    fn on_batch_start(&self, total_jobs: usize) {
        let _ = total_jobs;
    }

    /// Called just before a job is handed to the engine.
    /// `index` is the 0-based job index within the batch.
    fn on_job_start(&self, index: usize, total_jobs: usize) {
        let _ = (index, total_jobs);
    }

    /// Called when a job produced a PDF. `pdf_len` is the payload size in
    /// bytes.
    fn on_job_complete(&self, index: usize, total_jobs: usize, pdf_len: usize) {
        let _ = (index, total_jobs, pdf_len);
    }

    /// Called when a job failed. `reason` is the human-readable failure
    /// description.
    fn on_job_error(&self, index: usize, total_jobs: usize, reason: &str) {
        let _ = (index, total_jobs, reason);
    }

    /// Called once after every job has been attempted.
    fn on_batch_complete(&self, total_jobs: usize, success_count: usize) {
        let _ = (total_jobs, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::options::RenderOptions`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        batch_total: AtomicUsize,
        batch_successes: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_jobs: usize) {
            self.batch_total.store(total_jobs, Ordering::SeqCst);
        }

        fn on_job_start(&self, _index: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_job_complete(&self, _index: usize, _total: usize, _pdf_len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_job_error(&self, _index: usize, _total: usize, _reason: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total: usize, success_count: usize) {
            self.batch_successes.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(4);
        cb.on_job_start(0, 4);
        cb.on_job_complete(0, 4, 1024);
        cb.on_job_error(1, 4, "engine exited");
        cb.on_batch_complete(4, 3);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let t = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            batch_total: AtomicUsize::new(0),
            batch_successes: AtomicUsize::new(0),
        };

        t.on_batch_start(3);
        t.on_job_start(0, 3);
        t.on_job_complete(0, 3, 100);
        t.on_job_start(1, 3);
        t.on_job_error(1, 3, "timeout");
        t.on_job_start(2, 3);
        t.on_job_complete(2, 3, 200);
        t.on_batch_complete(3, 2);

        assert_eq!(t.batch_total.load(Ordering::SeqCst), 3);
        assert_eq!(t.starts.load(Ordering::SeqCst), 3);
        assert_eq!(t.completes.load(Ordering::SeqCst), 2);
        assert_eq!(t.errors.load(Ordering::SeqCst), 1);
        assert_eq!(t.batch_successes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn callback_is_object_safe() {
        let cb: Arc<dyn BatchProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_job_complete(0, 10, 512);
    }
}

//! Streaming conversion: outcomes as they are produced.
//!
//! The eager API ([`crate::convert_batch`]) holds every PDF in memory
//! until the whole batch finishes. For large batches, the streaming API
//! yields each `(index, outcome)` pair as soon as its job completes, so
//! callers can persist or forward results incrementally and let finished
//! payloads drop out of memory.
//!
//! Ordering depends on the mode: with `concurrency = 1` items arrive in
//! input order; with fan-out they arrive in completion order, and the
//! index identifies which job each outcome belongs to.

use crate::convert::run_job;
use crate::engine::{PdfEngine, WkhtmltopdfEngine};
use crate::job::ConversionJob;
use crate::options::RenderOptions;
use crate::output::JobOutcome;
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// A stream of `(job index, outcome)` pairs.
pub type JobStream = Pin<Box<dyn Stream<Item = (usize, JobOutcome)> + Send>>;

/// Stream batch outcomes using the default [`WkhtmltopdfEngine`].
///
/// The stream is lazy: no job runs until it is polled.
pub fn convert_batch_stream(jobs: Vec<ConversionJob>, options: RenderOptions) -> JobStream {
    let engine: Arc<dyn PdfEngine> = Arc::new(WkhtmltopdfEngine::new());
    convert_batch_stream_with_engine(jobs, options, engine)
}

/// Stream batch outcomes with an explicit engine.
///
/// The same per-job isolation applies as in the eager API: a failed job
/// yields a failure item and the stream continues. The stream always
/// produces exactly one item per input job.
pub fn convert_batch_stream_with_engine(
    jobs: Vec<ConversionJob>,
    options: RenderOptions,
    engine: Arc<dyn PdfEngine>,
) -> JobStream {
    let total = jobs.len();
    let concurrency = options.concurrency;
    let options = Arc::new(options);

    let inner: JobStream = if concurrency <= 1 {
        // `then` polls one job future at a time: strict input order.
        let options = Arc::clone(&options);
        Box::pin(
            stream::iter(jobs.into_iter().enumerate()).then(move |(index, job)| {
                let engine = Arc::clone(&engine);
                let options = Arc::clone(&options);
                async move { (index, run_streamed_job(&engine, index, total, &job, &options).await) }
            }),
        )
    } else {
        let options = Arc::clone(&options);
        Box::pin(
            stream::iter(jobs.into_iter().enumerate())
                .map(move |(index, job)| {
                    let engine = Arc::clone(&engine);
                    let options = Arc::clone(&options);
                    async move {
                        (index, run_streamed_job(&engine, index, total, &job, &options).await)
                    }
                })
                .buffer_unordered(concurrency),
        )
    };

    if options.progress_callback.is_none() {
        return inner;
    }
    Box::pin(ProgressEvents {
        inner,
        options,
        total,
        succeeded: 0,
        started: false,
        finished: false,
    })
}

/// Fires the batch-level progress events at the right moments for a lazy
/// stream: `on_batch_start` on the first poll, not at construction, and
/// `on_batch_complete` once every job has been yielded.
struct ProgressEvents {
    inner: JobStream,
    options: Arc<RenderOptions>,
    total: usize,
    succeeded: usize,
    started: bool,
    finished: bool,
}

impl Stream for ProgressEvents {
    type Item = (usize, JobOutcome);

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if !this.started {
            this.started = true;
            if let Some(ref cb) = this.options.progress_callback {
                cb.on_batch_start(this.total);
            }
        }
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(item)) => {
                if item.1.is_success() {
                    this.succeeded += 1;
                }
                Poll::Ready(Some(item))
            }
            Poll::Ready(None) => {
                if !this.finished {
                    this.finished = true;
                    if let Some(ref cb) = this.options.progress_callback {
                        cb.on_batch_complete(this.total, this.succeeded);
                    }
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

async fn run_streamed_job(
    engine: &Arc<dyn PdfEngine>,
    index: usize,
    total: usize,
    job: &ConversionJob,
    options: &RenderOptions,
) -> JobOutcome {
    if let Some(ref cb) = options.progress_callback {
        cb.on_job_start(index, total);
    }
    let outcome = run_job(engine, index, job, options).await;
    if let Some(ref cb) = options.progress_callback {
        match &outcome {
            JobOutcome::Success { pdf, .. } => cb.on_job_complete(index, total, pdf.len()),
            JobOutcome::Failure { error, .. } => cb.on_job_error(index, total, &error.to_string()),
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;
    use async_trait::async_trait;

    /// Engine that echoes the markup back as "PDF" bytes, failing when the
    /// markup contains the marker string `FAIL`.
    struct EchoEngine;

    #[async_trait]
    impl PdfEngine for EchoEngine {
        async fn render_html(
            &self,
            html: &str,
            _options: &RenderOptions,
        ) -> Result<Vec<u8>, JobError> {
            if html.contains("FAIL") {
                return Err(JobError::EmptyOutput);
            }
            Ok(html.as_bytes().to_vec())
        }

        async fn render_url(
            &self,
            url: &str,
            _options: &RenderOptions,
        ) -> Result<Vec<u8>, JobError> {
            Ok(url.as_bytes().to_vec())
        }
    }

    fn jobs(n: usize) -> Vec<ConversionJob> {
        (0..n)
            .map(|i| ConversionJob::inline(format!("<p>doc {i}</p>")))
            .collect()
    }

    #[tokio::test]
    async fn sequential_stream_yields_in_input_order() {
        let engine: Arc<dyn PdfEngine> = Arc::new(EchoEngine);
        let stream =
            convert_batch_stream_with_engine(jobs(4), RenderOptions::default(), engine);
        let items: Vec<(usize, JobOutcome)> = stream.collect().await;

        let indices: Vec<usize> = items.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(items.iter().all(|(_, o)| o.is_success()));
    }

    #[tokio::test]
    async fn concurrent_stream_yields_every_index_once() {
        let engine: Arc<dyn PdfEngine> = Arc::new(EchoEngine);
        let options = RenderOptions::builder().concurrency(3).build().unwrap();
        let stream = convert_batch_stream_with_engine(jobs(7), options, engine);
        let mut indices: Vec<usize> = stream.map(|(i, _)| i).collect().await;

        indices.sort_unstable();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn failed_job_does_not_end_the_stream() {
        let engine: Arc<dyn PdfEngine> = Arc::new(EchoEngine);
        let batch = vec![
            ConversionJob::inline("<p>ok</p>"),
            ConversionJob::inline("<p>FAIL</p>"),
            ConversionJob::inline("<p>ok</p>"),
        ];
        let stream = convert_batch_stream_with_engine(batch, RenderOptions::default(), engine);
        let items: Vec<(usize, JobOutcome)> = stream.collect().await;

        assert_eq!(items.len(), 3);
        assert!(items[0].1.is_success());
        assert!(!items[1].1.is_success());
        assert!(items[2].1.is_success());
    }

    #[tokio::test]
    async fn progress_events_fire_on_poll_not_construction() {
        use crate::progress::BatchProgressCallback;
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[derive(Default)]
        struct Recorder {
            starts: AtomicUsize,
            completes: AtomicUsize,
            successes: AtomicUsize,
        }

        impl BatchProgressCallback for Recorder {
            fn on_batch_start(&self, _total: usize) {
                self.starts.fetch_add(1, Ordering::SeqCst);
            }

            fn on_batch_complete(&self, _total: usize, success_count: usize) {
                self.completes.fetch_add(1, Ordering::SeqCst);
                self.successes.store(success_count, Ordering::SeqCst);
            }
        }

        let recorder = Arc::new(Recorder::default());
        let options = RenderOptions::builder()
            .progress_callback(recorder.clone() as Arc<dyn BatchProgressCallback>)
            .build()
            .unwrap();

        let batch = vec![
            ConversionJob::inline("<p>ok</p>"),
            ConversionJob::inline("<p>FAIL</p>"),
            ConversionJob::inline("<p>ok</p>"),
        ];
        let engine: Arc<dyn PdfEngine> = Arc::new(EchoEngine);
        let stream = convert_batch_stream_with_engine(batch, options, engine);

        assert_eq!(
            recorder.starts.load(Ordering::SeqCst),
            0,
            "constructing the stream must not signal a running batch"
        );

        let items: Vec<(usize, JobOutcome)> = stream.collect().await;
        assert_eq!(items.len(), 3);
        assert_eq!(recorder.starts.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.completes.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.successes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_batch_yields_empty_stream() {
        let engine: Arc<dyn PdfEngine> = Arc::new(EchoEngine);
        let stream =
            convert_batch_stream_with_engine(Vec::new(), RenderOptions::default(), engine);
        assert_eq!(stream.count().await, 0);
    }
}

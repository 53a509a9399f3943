//! Eager (full-batch) conversion entry points.
//!
//! ## The batch contract
//!
//! `convert_batch` takes N jobs and always returns N outcomes,
//! index-aligned with the input. One job's failure is recorded in its
//! slot and the loop moves on — no early return, and no job error ever
//! propagates out of the batch as an `Err`. The driver itself holds no
//! state across calls and performs no retries; whatever the engine
//! reports for a job is that job's outcome.
//!
//! With `concurrency = 1` (the default) jobs run strictly one at a time
//! in input order. Higher values fan jobs out and reassemble the results
//! by job index, so the ordering guarantee holds either way.

use crate::engine::{PdfEngine, WkhtmltopdfEngine};
use crate::error::Html2PdfError;
use crate::job::ConversionJob;
use crate::options::RenderOptions;
use crate::output::{BatchOutput, JobOutcome};
use crate::template;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a single job, returning the PDF bytes.
///
/// Uses the default [`WkhtmltopdfEngine`]. This is the "return bytes"
/// output mode; see [`convert_to_file`] for the "persist" mode.
///
/// # Errors
/// The single-job entry points promote the job's failure to
/// [`Html2PdfError::JobFailed`]; batch entry points never do.
pub async fn convert(
    job: &ConversionJob,
    options: &RenderOptions,
) -> Result<Vec<u8>, Html2PdfError> {
    let engine: Arc<dyn PdfEngine> = Arc::new(WkhtmltopdfEngine::new());
    convert_with_engine(job, options, &engine).await
}

/// Convert a single job with an explicit engine.
pub async fn convert_with_engine(
    job: &ConversionJob,
    options: &RenderOptions,
    engine: &Arc<dyn PdfEngine>,
) -> Result<Vec<u8>, Html2PdfError> {
    run_job(engine, 0, job, options)
        .await
        .into_result()
        .map_err(Html2PdfError::JobFailed)
}

/// Convert a single job and write the PDF to `path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
/// Returns the number of bytes written.
pub async fn convert_to_file(
    job: &ConversionJob,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<u64, Html2PdfError> {
    let engine: Arc<dyn PdfEngine> = Arc::new(WkhtmltopdfEngine::new());
    convert_to_file_with_engine(job, path, options, &engine).await
}

/// Convert a single job and write the PDF to `path`, with an explicit
/// engine.
pub async fn convert_to_file_with_engine(
    job: &ConversionJob,
    path: impl AsRef<Path>,
    options: &RenderOptions,
    engine: &Arc<dyn PdfEngine>,
) -> Result<u64, Html2PdfError> {
    let pdf = convert_with_engine(job, options, engine).await?;
    let path = path.as_ref();
    write_atomic(path, &pdf)
        .await
        .map_err(|source| Html2PdfError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(pdf.len() as u64)
}

/// Convert a batch of jobs, returning one outcome per job.
///
/// Uses the default [`WkhtmltopdfEngine`]. Never fails as a whole:
/// per-job failures are recorded in the index-aligned outcome list, and
/// an empty batch yields an empty output.
pub async fn convert_batch(jobs: &[ConversionJob], options: &RenderOptions) -> BatchOutput {
    let engine: Arc<dyn PdfEngine> = Arc::new(WkhtmltopdfEngine::new());
    convert_batch_with_engine(jobs, options, &engine).await
}

/// Convert a batch of jobs with an explicit engine.
pub async fn convert_batch_with_engine(
    jobs: &[ConversionJob],
    options: &RenderOptions,
    engine: &Arc<dyn PdfEngine>,
) -> BatchOutput {
    let start = Instant::now();
    let total = jobs.len();
    info!(
        total_jobs = total,
        concurrency = options.concurrency,
        "starting batch conversion"
    );

    if let Some(ref cb) = options.progress_callback {
        cb.on_batch_start(total);
    }

    let outcomes = if options.concurrency <= 1 {
        process_sequential(engine, jobs, options).await
    } else {
        process_concurrent(engine, jobs, options).await
    };
    debug_assert_eq!(outcomes.len(), total);

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    if let Some(ref cb) = options.progress_callback {
        cb.on_batch_complete(total, succeeded);
    }

    let total_duration_ms = start.elapsed().as_millis() as u64;
    info!(
        succeeded,
        failed = total - succeeded,
        total_duration_ms,
        "batch conversion complete"
    );

    BatchOutput::from_outcomes(outcomes, total_duration_ms)
}

/// Convert a batch and write each successful PDF to
/// `<dir>/<stem><index>.pdf`.
///
/// Directory creation failure is fatal (nothing can be persisted); a
/// write failure on one job downgrades that job's outcome to a failure
/// and the rest of the batch is persisted normally.
pub async fn convert_batch_to_dir(
    jobs: &[ConversionJob],
    dir: impl AsRef<Path>,
    stem: &str,
    options: &RenderOptions,
    engine: &Arc<dyn PdfEngine>,
) -> Result<BatchOutput, Html2PdfError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| Html2PdfError::OutputDirFailed {
            path: dir.to_path_buf(),
            source,
        })?;

    let start = Instant::now();
    let mut output = convert_batch_with_engine(jobs, options, engine).await;

    for (index, outcome) in output.outcomes.iter_mut().enumerate() {
        let Some(pdf) = outcome.pdf() else { continue };
        let path = job_output_path(dir, stem, index);
        if let Err(e) = write_atomic(&path, pdf).await {
            warn!(index, path = %path.display(), error = %e, "failed to persist job output");
            *outcome = JobOutcome::Failure {
                error: crate::error::JobError::Io {
                    detail: format!("writing '{}': {e}", path.display()),
                },
                duration_ms: outcome.duration_ms(),
            };
        } else {
            debug!(index, path = %path.display(), "persisted job output");
        }
    }

    // Stats may have changed if any write was downgraded to a failure.
    Ok(BatchOutput::from_outcomes(
        output.outcomes,
        start.elapsed().as_millis() as u64,
    ))
}

/// The path a batch job's PDF is written to by [`convert_batch_to_dir`].
pub fn job_output_path(dir: &Path, stem: &str, index: usize) -> PathBuf {
    dir.join(format!("{stem}{index}.pdf"))
}

/// Synchronous wrapper around [`convert_batch`].
///
/// Creates a temporary tokio runtime internally. Must not be called from
/// within an async context.
pub fn convert_batch_sync(
    jobs: &[ConversionJob],
    options: &RenderOptions,
) -> Result<BatchOutput, Html2PdfError> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Html2PdfError::Internal(format!("Failed to create tokio runtime: {e}")))?;
    Ok(rt.block_on(convert_batch(jobs, options)))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run one job through the engine, always producing an outcome.
///
/// This is the isolation boundary: template rendering and engine failures
/// are caught here and recorded, never propagated.
pub(crate) async fn run_job(
    engine: &Arc<dyn PdfEngine>,
    index: usize,
    job: &ConversionJob,
    options: &RenderOptions,
) -> JobOutcome {
    let start = Instant::now();

    let result = match job {
        ConversionJob::InlineHtml(html) => engine.render_html(html, options).await,
        ConversionJob::RemoteUrl(url) => engine.render_url(url, options).await,
        ConversionJob::Template { source, model } => match template::render(source, model) {
            Ok(html) => engine.render_html(&html, options).await,
            Err(e) => Err(e),
        },
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(pdf) => {
            debug!(index, kind = job.kind(), pdf_bytes = pdf.len(), duration_ms, "job succeeded");
            JobOutcome::Success { pdf, duration_ms }
        }
        Err(error) => {
            warn!(index, kind = job.kind(), duration_ms, %error, "job failed");
            JobOutcome::Failure { error, duration_ms }
        }
    }
}

/// Strictly sequential processing in input order (concurrency = 1).
async fn process_sequential(
    engine: &Arc<dyn PdfEngine>,
    jobs: &[ConversionJob],
    options: &RenderOptions,
) -> Vec<JobOutcome> {
    let total = jobs.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, job) in jobs.iter().enumerate() {
        if let Some(ref cb) = options.progress_callback {
            cb.on_job_start(index, total);
        }
        let outcome = run_job(engine, index, job, options).await;
        notify_outcome(options, index, total, &outcome);
        outcomes.push(outcome);
    }

    outcomes
}

/// Concurrent fan-out; outcomes reassembled by job index so the output
/// order matches the input order regardless of completion order.
async fn process_concurrent(
    engine: &Arc<dyn PdfEngine>,
    jobs: &[ConversionJob],
    options: &RenderOptions,
) -> Vec<JobOutcome> {
    let total = jobs.len();

    let mut indexed: Vec<(usize, JobOutcome)> =
        stream::iter(jobs.iter().enumerate().map(|(index, job)| async move {
            if let Some(ref cb) = options.progress_callback {
                cb.on_job_start(index, total);
            }
            let outcome = run_job(engine, index, job, options).await;
            notify_outcome(options, index, total, &outcome);
            (index, outcome)
        }))
        .buffer_unordered(options.concurrency)
        .collect()
        .await;

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, outcome)| outcome).collect()
}

fn notify_outcome(options: &RenderOptions, index: usize, total: usize, outcome: &JobOutcome) {
    let Some(ref cb) = options.progress_callback else {
        return;
    };
    match outcome {
        JobOutcome::Success { pdf, .. } => cb.on_job_complete(index, total, pdf.len()),
        JobOutcome::Failure { error, .. } => cb.on_job_error(index, total, &error.to_string()),
    }
}

/// Atomic write: temp file in the target directory, then rename.
async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, bytes).await?;
    tokio::fs::rename(&tmp_path, path).await
}

//! Error types for the html2pdf-batch library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Html2PdfError`] — **Fatal**: the call cannot proceed at all
//!   (invalid options, output file cannot be written, engine binary
//!   missing). Returned as `Err(Html2PdfError)` from the top-level
//!   `convert*` functions.
//!
//! * [`JobError`] — **Non-fatal**: a single job failed (template render
//!   error, engine crash, timeout) but all other jobs in the batch are
//!   fine. Stored inside [`crate::output::JobOutcome::Failure`] so callers
//!   can inspect partial success rather than losing the whole batch to one
//!   bad job.
//!
//! The separation keeps the batch invariant intact: no job error ever
//! crosses the batch boundary as an `Err`.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the html2pdf-batch library.
///
/// Job-level failures use [`JobError`] and are stored in
/// [`crate::output::JobOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Html2PdfError {
    /// Builder validation failed.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Could not create or write an output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested output directory does not exist and could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single-job conversion failed.
    ///
    /// Only the single-job entry points ([`crate::convert::convert`] and
    /// [`crate::convert::convert_to_file`]) promote the job failure to a
    /// fatal error; batch entry points never do.
    #[error("Conversion failed: {0}")]
    JobFailed(#[from] JobError),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single conversion job.
///
/// Stored in [`crate::output::JobOutcome::Failure`] when a job fails.
/// The batch continues regardless of how many jobs fail.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum JobError {
    /// Template text could not be rendered against the model.
    #[error("template rendering failed: {detail}")]
    TemplateRender { detail: String },

    /// The job's URL is not http or https.
    #[error("invalid URL '{url}': only http:// and https:// are supported")]
    InvalidUrl { url: String },

    /// The engine binary could not be spawned.
    #[error("failed to spawn engine '{binary}': {detail}")]
    EngineSpawn { binary: String, detail: String },

    /// The engine exited with a non-zero status.
    #[error("engine exited with status {status}: {stderr}")]
    EngineExit { status: i32, stderr: String },

    /// The engine exceeded the configured conversion timeout and was killed.
    #[error("conversion timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The engine reported success but produced no PDF bytes.
    #[error("engine produced no output")]
    EmptyOutput,

    /// I/O failure while feeding the engine or collecting its output.
    #[error("engine I/O failed: {detail}")]
    Io { detail: String },
}

impl JobError {
    /// Stable machine-readable class of the failure, independent of the
    /// per-occurrence detail text. Two runs of the same bad job compare
    /// equal on this even when paths or stderr differ.
    pub fn class(&self) -> &'static str {
        match self {
            JobError::TemplateRender { .. } => "template-render",
            JobError::InvalidUrl { .. } => "invalid-url",
            JobError::EngineSpawn { .. } => "engine-spawn",
            JobError::EngineExit { .. } => "engine-exit",
            JobError::Timeout { .. } => "timeout",
            JobError::EmptyOutput => "empty-output",
            JobError::Io { .. } => "io",
        }
    }
}

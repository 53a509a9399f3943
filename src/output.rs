//! Output types: per-job outcomes, batch assembly, and run statistics.
//!
//! The central invariant lives here: a batch of N jobs always yields
//! exactly N outcomes, index-aligned with the input (`outcomes[i]`
//! belongs to `jobs[i]`), no matter how many jobs fail.

use crate::error::JobError;
use serde::{Deserialize, Serialize};

/// The result of one conversion job — exactly one variant, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JobOutcome {
    /// The engine produced a PDF.
    Success {
        /// The PDF payload.
        #[serde(skip_serializing_if = "Vec::is_empty", default)]
        pdf: Vec<u8>,
        /// Wall-clock time spent on this job.
        duration_ms: u64,
    },
    /// The job failed; the rest of the batch is unaffected.
    Failure {
        error: JobError,
        duration_ms: u64,
    },
}

impl JobOutcome {
    /// True for [`JobOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success { .. })
    }

    /// The PDF bytes, if the job succeeded.
    pub fn pdf(&self) -> Option<&[u8]> {
        match self {
            JobOutcome::Success { pdf, .. } => Some(pdf),
            JobOutcome::Failure { .. } => None,
        }
    }

    /// The failure reason, if the job failed.
    pub fn error(&self) -> Option<&JobError> {
        match self {
            JobOutcome::Success { .. } => None,
            JobOutcome::Failure { error, .. } => Some(error),
        }
    }

    /// Wall-clock duration of the job, success or not.
    pub fn duration_ms(&self) -> u64 {
        match self {
            JobOutcome::Success { duration_ms, .. } => *duration_ms,
            JobOutcome::Failure { duration_ms, .. } => *duration_ms,
        }
    }

    /// Convert into a `Result`, discarding timing.
    pub fn into_result(self) -> Result<Vec<u8>, JobError> {
        match self {
            JobOutcome::Success { pdf, .. } => Ok(pdf),
            JobOutcome::Failure { error, .. } => Err(error),
        }
    }
}

/// Statistics for one batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// Number of jobs submitted.
    pub total_jobs: usize,
    /// Jobs that produced a PDF.
    pub succeeded: usize,
    /// Jobs that failed.
    pub failed: usize,
    /// Total bytes of PDF produced across all successful jobs.
    pub total_pdf_bytes: u64,
    /// Wall-clock time for the whole batch.
    pub total_duration_ms: u64,
}

/// The result of a batch conversion.
///
/// `outcomes.len()` always equals the number of submitted jobs, and
/// `outcomes[i]` corresponds to `jobs[i]`. An empty batch yields an
/// empty outcome list, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// Per-job outcomes, index-aligned with the input jobs.
    pub outcomes: Vec<JobOutcome>,
    /// Aggregate statistics.
    pub stats: BatchStats,
}

impl BatchOutput {
    /// Assemble a batch output from index-aligned outcomes.
    pub(crate) fn from_outcomes(outcomes: Vec<JobOutcome>, total_duration_ms: u64) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let total_pdf_bytes = outcomes
            .iter()
            .filter_map(|o| o.pdf())
            .map(|p| p.len() as u64)
            .sum();
        let stats = BatchStats {
            total_jobs: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            total_pdf_bytes,
            total_duration_ms,
        };
        BatchOutput { outcomes, stats }
    }

    /// Iterate over the failed jobs as `(index, error)` pairs.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &JobError)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.error().map(|e| (i, e)))
    }

    /// True when every job in the batch succeeded. An empty batch counts
    /// as fully successful.
    pub fn all_succeeded(&self) -> bool {
        self.stats.failed == 0
    }
}

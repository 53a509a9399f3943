//! # html2pdf-batch
//!
//! Convert HTML to PDF — single documents or whole batches — through the
//! `wkhtmltopdf` engine, with per-job fault isolation.
//!
//! ## Why this crate?
//!
//! Rendering one page is easy; rendering five hundred invoices is where
//! things go wrong. One malformed template, one dead URL, or one stuck
//! engine process should cost exactly one output, not the whole run. This
//! crate is the batch driver around the engine: it submits jobs, enforces
//! timeouts, records each job's outcome in its own slot, and hands back a
//! result list that always lines up one-to-one with the input.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Jobs (inline HTML / URL / template + model)
//!  │
//!  ├─ 1. Template  render Tera templates against their JSON models
//!  ├─ 2. Engine    spawn wkhtmltopdf per job (flags from RenderOptions)
//!  ├─ 3. Collect   PDF bytes from stdout, stderr captured on failure
//!  ├─ 4. Isolate   failures recorded as that job's outcome, batch continues
//!  └─ 5. Output    index-aligned outcomes + batch stats, or files on disk
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use html2pdf_batch::{convert_batch, ConversionJob, RenderOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let jobs = vec![
//!         ConversionJob::inline("<h1>Hello</h1>"),
//!         ConversionJob::url("https://example.com"),
//!     ];
//!     let output = convert_batch(&jobs, &RenderOptions::default()).await;
//!     for (index, outcome) in output.outcomes.iter().enumerate() {
//!         match outcome.pdf() {
//!             Some(pdf) => println!("job {index}: {} bytes", pdf.len()),
//!             None => eprintln!("job {index}: {}", outcome.error().unwrap()),
//!         }
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `html2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! html2pdf-batch = { version = "0.3", default-features = false }
//! ```
//!
//! ## Requirements
//!
//! The default engine shells out to [wkhtmltopdf]; the binary must be on
//! `PATH` or named via the `WKHTMLTOPDF_PATH` environment variable. Any
//! other converter can be plugged in by implementing [`PdfEngine`].
//!
//! [wkhtmltopdf]: https://wkhtmltopdf.org/

// ── Modules ──────────────────────────────────────────────────────────────

pub mod convert;
pub mod engine;
pub mod error;
pub mod job;
pub mod options;
pub mod output;
pub mod progress;
pub mod stream;
pub mod template;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use convert::{
    convert, convert_batch, convert_batch_sync, convert_batch_to_dir, convert_batch_with_engine,
    convert_to_file, convert_to_file_with_engine, convert_with_engine,
};
pub use engine::{is_url, PdfEngine, WkhtmltopdfEngine};
pub use error::{Html2PdfError, JobError};
pub use job::ConversionJob;
pub use options::{
    PageBand, PageMargins, PageOrientation, PageSize, RenderOptions, RenderOptionsBuilder,
    TextAlignment,
};
pub use output::{BatchOutput, BatchStats, JobOutcome};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_batch_stream, convert_batch_stream_with_engine, JobStream};

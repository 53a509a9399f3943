//! Engine wrapper around the `wkhtmltopdf` binary.
//!
//! ## Why a temp file for inline HTML?
//!
//! wkhtmltopdf resolves relative resources (images, stylesheets) against
//! the input document's location, and its stdin mode disables that
//! resolution entirely. Writing the markup to a managed temp file with an
//! `.html` suffix gives the binary a real path to work from while
//! `NamedTempFile` guarantees cleanup when the conversion returns, even
//! on panic. The PDF always comes back on stdout (`-` output argument),
//! so no output file management is needed.
//!
//! ## Timeout enforcement
//!
//! The child is spawned with `kill_on_drop`; when the configured timeout
//! elapses, the `wait_with_output` future is dropped and tokio kills the
//! process. A stuck render therefore costs one job its outcome, never the
//! batch.

use crate::error::JobError;
use crate::options::RenderOptions;
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::{is_url, PdfEngine};

/// Environment variable naming an explicit engine binary path.
pub const BINARY_PATH_ENV: &str = "WKHTMLTOPDF_PATH";

/// Longest stderr excerpt carried into a [`JobError::EngineExit`].
const MAX_STDERR_BYTES: usize = 400;

/// The default engine: spawns `wkhtmltopdf` once per job.
///
/// The binary is resolved, in order, from an explicit
/// [`WkhtmltopdfEngine::with_binary`] path, the `WKHTMLTOPDF_PATH`
/// environment variable, or plain `wkhtmltopdf` on `PATH`.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfEngine {
    binary: PathBuf,
}

impl Default for WkhtmltopdfEngine {
    fn default() -> Self {
        let binary = std::env::var_os(BINARY_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("wkhtmltopdf"));
        Self { binary }
    }
}

impl WkhtmltopdfEngine {
    /// Engine using the default binary resolution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine using an explicit binary path.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// The resolved binary path.
    pub fn binary(&self) -> &std::path::Path {
        &self.binary
    }

    /// Run the binary on `input` (a path or URL), collecting the PDF from
    /// stdout.
    async fn run(&self, input: &str, options: &RenderOptions) -> Result<Vec<u8>, JobError> {
        let args = options.to_args();
        debug!(binary = %self.binary.display(), input, "invoking engine");

        let child = Command::new(&self.binary)
            .args(&args)
            .arg(input)
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| JobError::EngineSpawn {
                binary: self.binary.display().to_string(),
                detail: e.to_string(),
            })?;

        let wait = child.wait_with_output();
        let output = match timeout(Duration::from_millis(options.timeout_ms), wait).await {
            // Dropping the future above killed the child (kill_on_drop).
            Err(_) => {
                warn!(input, timeout_ms = options.timeout_ms, "engine timed out, killed");
                return Err(JobError::Timeout {
                    ms: options.timeout_ms,
                });
            }
            Ok(Err(e)) => {
                return Err(JobError::Io {
                    detail: e.to_string(),
                })
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = truncate_stderr(stderr.trim());
            return Err(JobError::EngineExit {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        if output.stdout.is_empty() {
            return Err(JobError::EmptyOutput);
        }

        debug!(input, pdf_bytes = output.stdout.len(), "engine produced PDF");
        Ok(output.stdout)
    }
}

#[async_trait]
impl PdfEngine for WkhtmltopdfEngine {
    async fn render_html(
        &self,
        html: &str,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, JobError> {
        let mut tmp = tempfile::Builder::new()
            .prefix("html2pdf-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| JobError::Io {
                detail: format!("tempfile: {e}"),
            })?;
        tmp.write_all(html.as_bytes()).map_err(|e| JobError::Io {
            detail: format!("tempfile write: {e}"),
        })?;
        tmp.flush().map_err(|e| JobError::Io {
            detail: format!("tempfile flush: {e}"),
        })?;

        let path = tmp.path().to_string_lossy().to_string();
        // `tmp` stays alive until the engine finishes reading it.
        let result = self.run(&path, options).await;
        drop(tmp);
        result
    }

    async fn render_url(&self, url: &str, options: &RenderOptions) -> Result<Vec<u8>, JobError> {
        if !is_url(url) {
            return Err(JobError::InvalidUrl {
                url: url.to_string(),
            });
        }
        self.run(url, options).await
    }
}

fn truncate_stderr(s: &str) -> String {
    if s.len() <= MAX_STDERR_BYTES {
        return s.to_string();
    }
    let mut end = MAX_STDERR_BYTES;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\u{2026}", &s[..end])
}

//! The external conversion service seam.
//!
//! The driver never renders HTML itself — all layout and PDF work happens
//! behind [`PdfEngine`]. The default implementation
//! ([`WkhtmltopdfEngine`]) shells out to the `wkhtmltopdf` binary; tests
//! inject mock engines through the same trait, so driver behaviour
//! (ordering, isolation, persistence) is verifiable without any external
//! binary installed.

use crate::error::JobError;
use crate::options::RenderOptions;
use async_trait::async_trait;

pub mod wkhtmltopdf;

pub use wkhtmltopdf::WkhtmltopdfEngine;

/// An HTML-to-PDF conversion service.
///
/// Implementations receive fully-prepared source material: template jobs
/// are already rendered to HTML before the engine sees them. Both methods
/// return the PDF payload on success; every failure mode maps to a
/// [`JobError`], which the driver stores as that job's outcome.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    /// Convert literal HTML markup to PDF bytes.
    async fn render_html(
        &self,
        html: &str,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, JobError>;

    /// Fetch and convert a remote page to PDF bytes.
    async fn render_url(&self, url: &str, options: &RenderOptions) -> Result<Vec<u8>, JobError>;
}

/// Check whether the input string is an http/https URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/page"));
        assert!(is_url("http://example.com"));
        assert!(!is_url("/tmp/page.html"));
        assert!(!is_url("page.html"));
        assert!(!is_url("ftp://example.com"));
        assert!(!is_url(""));
    }
}

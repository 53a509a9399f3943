//! Configuration for HTML-to-PDF conversion.
//!
//! All engine behaviour is controlled through [`RenderOptions`], built via
//! its [`RenderOptionsBuilder`]. One batch shares one `RenderOptions`
//! value: the driver passes it read-only to every job, so two jobs in the
//! same batch can never disagree about page geometry or timeouts.
//!
//! # Design choice: builder over constructor
//! The engine exposes well over twenty knobs (the wkhtmltopdf flag
//! surface). A constructor with that arity is unreadable and breaks on
//! every new field. The builder lets callers set only what they care about
//! and rely on documented defaults for the rest.

use crate::error::Html2PdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Page orientation of the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageOrientation {
    #[default]
    Portrait,
    Landscape,
}

impl PageOrientation {
    fn as_flag_value(self) -> &'static str {
        match self {
            PageOrientation::Portrait => "Portrait",
            PageOrientation::Landscape => "Landscape",
        }
    }
}

/// Standard page size of the rendered document.
///
/// Ignored when an explicit width/height pair is set — the pair has
/// priority, matching the engine's own precedence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PageSize {
    fn as_flag_value(self) -> &'static str {
        match self {
            PageSize::A3 => "A3",
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
        }
    }
}

/// Horizontal alignment of header or footer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// Header or footer band: text, placement, and typography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBand {
    /// Text placed in the band. Supports the engine's `[page]`/`[topage]`
    /// substitution variables.
    pub text: String,
    pub alignment: TextAlignment,
    pub font_name: String,
    pub font_size: u32,
    /// Draw a rule between the band and the page body.
    pub line: bool,
    /// Spacing between the band and the page body, in millimetres.
    pub spacing_mm: u32,
}

impl PageBand {
    /// A band with the given text and the engine's typography defaults.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            alignment: TextAlignment::Center,
            font_name: "Arial".to_string(),
            font_size: 12,
            line: false,
            spacing_mm: 0,
        }
    }

    fn push_args(&self, args: &mut Vec<String>, which: &str) {
        let slot = match self.alignment {
            TextAlignment::Left => "left",
            TextAlignment::Center => "center",
            TextAlignment::Right => "right",
        };
        args.push(format!("--{which}-{slot}"));
        args.push(self.text.clone());
        args.push(format!("--{which}-font-name"));
        args.push(self.font_name.clone());
        args.push(format!("--{which}-font-size"));
        args.push(self.font_size.to_string());
        if self.line {
            args.push(format!("--{which}-line"));
        }
        if self.spacing_mm > 0 {
            args.push(format!("--{which}-spacing"));
            args.push(self.spacing_mm.to_string());
        }
    }
}

/// Shared, read-only configuration for a conversion batch.
///
/// Built via [`RenderOptions::builder()`] or [`RenderOptions::default()`].
///
/// # Example
/// ```rust
/// use html2pdf_batch::{PageOrientation, RenderOptions};
///
/// let options = RenderOptions::builder()
///     .image_quality(80)
///     .grayscale(true)
///     .orientation(PageOrientation::Landscape)
///     .margins_mm(10, 10, 10, 10)
///     .timeout_ms(10_000)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct RenderOptions {
    /// JPEG quality used when the engine re-compresses images. Range 0–100. Default: 94.
    pub image_quality: u8,

    /// Print CSS backgrounds. Default: true.
    pub print_background: bool,

    /// Load and print images. Default: true.
    ///
    /// Disabling this is the fastest way to convert image-heavy pages when
    /// only the text matters; remote image fetches dominate render time.
    pub load_images: bool,

    /// Lossless compression of PDF objects. Default: true.
    pub pdf_compression: bool,

    /// Emit links to remote web pages. Default: true.
    pub external_links: bool,

    /// Emit links to in-document anchors. Default: true.
    pub internal_links: bool,

    /// Title of the generated PDF. If None, the engine uses the title of
    /// the first document.
    pub title: Option<String>,

    /// Generate the PDF in lower quality. Default: false.
    ///
    /// Roughly halves output size and render time at the cost of image
    /// fidelity. Useful for draft or preview batches.
    pub low_quality: bool,

    /// Number of copies printed into the PDF. Default: 1.
    pub copies: u32,

    /// Render in grayscale. Default: false.
    pub grayscale: bool,

    /// `[name] → value` substitutions applied to header and footer text.
    /// Repeatable; applied in insertion order.
    pub replacements: Vec<(String, String)>,

    /// Starting page number offset. Default: 0.
    pub page_offset: i32,

    /// Page margins in millimetres. If None, engine defaults apply.
    pub margins: Option<PageMargins>,

    /// Explicit page width/height pair in millimetres.
    ///
    /// Has priority over [`RenderOptions::page_size`], but only as a pair:
    /// the builder rejects one without the other, mirroring the engine's
    /// requirement.
    pub page_dimensions_mm: Option<(u32, u32)>,

    /// Page orientation. Default: portrait.
    pub orientation: PageOrientation,

    /// Standard page size. Default: A4. Ignored when
    /// [`RenderOptions::page_dimensions_mm`] is set.
    pub page_size: PageSize,

    /// Intelligent shrinking to fit more content per page. Default: true.
    pub smart_shrinking: bool,

    /// Turn HTML form fields into PDF form fields. Default: false.
    pub forms: bool,

    /// Header band. If None, no header is printed.
    pub header: Option<PageBand>,

    /// Footer band. If None, no footer is printed.
    pub footer: Option<PageBand>,

    /// Per-job conversion timeout in milliseconds. Default: 30 000.
    ///
    /// Enforced by the engine wrapper, which kills the child process on
    /// expiry. The batch driver itself has no timeout logic — a stuck
    /// engine surfaces as that one job's timeout failure.
    pub timeout_ms: u64,

    /// Suppress the engine's own progress chatter on stderr. Default: true.
    /// Real errors are still reported and captured either way.
    pub quiet: bool,

    /// Number of jobs converted concurrently. Default: 1 (strictly
    /// sequential).
    ///
    /// The engine is an external process per job, so fan-out scales until
    /// the machine runs out of cores or memory. Outcome ordering is
    /// preserved regardless: the driver reassembles results by job index.
    pub concurrency: usize,

    /// Per-job progress events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_quality: 94,
            print_background: true,
            load_images: true,
            pdf_compression: true,
            external_links: true,
            internal_links: true,
            title: None,
            low_quality: false,
            copies: 1,
            grayscale: false,
            replacements: Vec::new(),
            page_offset: 0,
            margins: None,
            page_dimensions_mm: None,
            orientation: PageOrientation::default(),
            page_size: PageSize::default(),
            smart_shrinking: true,
            forms: false,
            header: None,
            footer: None,
            timeout_ms: 30_000,
            quiet: true,
            concurrency: 1,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("image_quality", &self.image_quality)
            .field("print_background", &self.print_background)
            .field("load_images", &self.load_images)
            .field("pdf_compression", &self.pdf_compression)
            .field("title", &self.title)
            .field("low_quality", &self.low_quality)
            .field("copies", &self.copies)
            .field("grayscale", &self.grayscale)
            .field("page_offset", &self.page_offset)
            .field("margins", &self.margins)
            .field("page_dimensions_mm", &self.page_dimensions_mm)
            .field("orientation", &self.orientation)
            .field("page_size", &self.page_size)
            .field("smart_shrinking", &self.smart_shrinking)
            .field("forms", &self.forms)
            .field("header", &self.header)
            .field("footer", &self.footer)
            .field("timeout_ms", &self.timeout_ms)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl RenderOptions {
    /// Create a new builder for `RenderOptions`.
    pub fn builder() -> RenderOptionsBuilder {
        RenderOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Render the engine flag vector for these options.
    ///
    /// The result is deterministic: the same options always produce the
    /// same flags in the same order, which keeps conversions repeatable
    /// and the mapping unit-testable without spawning a process.
    ///
    /// The conversion timeout and the driver-facing knobs (`concurrency`,
    /// progress callback) deliberately have no flag: the former is
    /// enforced by killing the child, the latter never reach the engine.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        if self.quiet {
            args.push("--quiet".into());
        }
        if self.image_quality != 94 {
            args.push("--image-quality".into());
            args.push(self.image_quality.to_string());
        }
        if !self.print_background {
            args.push("--no-background".into());
        }
        if !self.load_images {
            args.push("--no-images".into());
        }
        if !self.pdf_compression {
            args.push("--no-pdf-compression".into());
        }
        if !self.external_links {
            args.push("--disable-external-links".into());
        }
        if !self.internal_links {
            args.push("--disable-internal-links".into());
        }
        if let Some(ref title) = self.title {
            args.push("--title".into());
            args.push(title.clone());
        }
        if self.low_quality {
            args.push("--lowquality".into());
        }
        if self.copies != 1 {
            args.push("--copies".into());
            args.push(self.copies.to_string());
        }
        if self.grayscale {
            args.push("--grayscale".into());
        }
        for (name, value) in &self.replacements {
            args.push("--replace".into());
            args.push(name.clone());
            args.push(value.clone());
        }
        if self.page_offset != 0 {
            args.push("--page-offset".into());
            args.push(self.page_offset.to_string());
        }
        if let Some(m) = self.margins {
            args.push("--margin-top".into());
            args.push(format!("{}mm", m.top));
            args.push("--margin-bottom".into());
            args.push(format!("{}mm", m.bottom));
            args.push("--margin-left".into());
            args.push(format!("{}mm", m.left));
            args.push("--margin-right".into());
            args.push(format!("{}mm", m.right));
        }
        // Width/height pair wins over --page-size.
        if let Some((w, h)) = self.page_dimensions_mm {
            args.push("--page-width".into());
            args.push(format!("{w}mm"));
            args.push("--page-height".into());
            args.push(format!("{h}mm"));
        } else {
            args.push("--page-size".into());
            args.push(self.page_size.as_flag_value().into());
        }
        if self.orientation != PageOrientation::Portrait {
            args.push("--orientation".into());
            args.push(self.orientation.as_flag_value().into());
        }
        if !self.smart_shrinking {
            args.push("--disable-smart-shrinking".into());
        }
        if self.forms {
            args.push("--enable-forms".into());
        }
        if let Some(ref header) = self.header {
            header.push_args(&mut args, "header");
        }
        if let Some(ref footer) = self.footer {
            footer.push_args(&mut args, "footer");
        }

        args
    }
}

/// Builder for [`RenderOptions`].
#[derive(Debug)]
pub struct RenderOptionsBuilder {
    options: RenderOptions,
}

impl RenderOptionsBuilder {
    pub fn image_quality(mut self, q: u8) -> Self {
        self.options.image_quality = q.min(100);
        self
    }

    pub fn print_background(mut self, v: bool) -> Self {
        self.options.print_background = v;
        self
    }

    pub fn load_images(mut self, v: bool) -> Self {
        self.options.load_images = v;
        self
    }

    pub fn pdf_compression(mut self, v: bool) -> Self {
        self.options.pdf_compression = v;
        self
    }

    pub fn external_links(mut self, v: bool) -> Self {
        self.options.external_links = v;
        self
    }

    pub fn internal_links(mut self, v: bool) -> Self {
        self.options.internal_links = v;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.options.title = Some(title.into());
        self
    }

    pub fn low_quality(mut self, v: bool) -> Self {
        self.options.low_quality = v;
        self
    }

    pub fn copies(mut self, n: u32) -> Self {
        self.options.copies = n.max(1);
        self
    }

    pub fn grayscale(mut self, v: bool) -> Self {
        self.options.grayscale = v;
        self
    }

    /// Replace `[name]` with `value` in header and footer text. Repeatable.
    pub fn replace(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.replacements.push((name.into(), value.into()));
        self
    }

    pub fn page_offset(mut self, n: i32) -> Self {
        self.options.page_offset = n;
        self
    }

    pub fn margins_mm(mut self, top: u32, bottom: u32, left: u32, right: u32) -> Self {
        self.options.margins = Some(PageMargins {
            top,
            bottom,
            left,
            right,
        });
        self
    }

    /// Explicit page width and height in millimetres. Overrides
    /// [`RenderOptionsBuilder::page_size`].
    pub fn page_dimensions_mm(mut self, width: u32, height: u32) -> Self {
        self.options.page_dimensions_mm = Some((width, height));
        self
    }

    pub fn orientation(mut self, o: PageOrientation) -> Self {
        self.options.orientation = o;
        self
    }

    pub fn page_size(mut self, s: PageSize) -> Self {
        self.options.page_size = s;
        self
    }

    pub fn smart_shrinking(mut self, v: bool) -> Self {
        self.options.smart_shrinking = v;
        self
    }

    pub fn forms(mut self, v: bool) -> Self {
        self.options.forms = v;
        self
    }

    pub fn header(mut self, band: PageBand) -> Self {
        self.options.header = Some(band);
        self
    }

    pub fn footer(mut self, band: PageBand) -> Self {
        self.options.footer = Some(band);
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.options.timeout_ms = ms.max(1);
        self
    }

    pub fn quiet(mut self, v: bool) -> Self {
        self.options.quiet = v;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.options.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.options.progress_callback = Some(cb);
        self
    }

    /// Build the options, validating cross-field constraints.
    pub fn build(self) -> Result<RenderOptions, Html2PdfError> {
        let o = &self.options;
        if o.image_quality > 100 {
            return Err(Html2PdfError::InvalidOptions(format!(
                "image quality must be 0–100, got {}",
                o.image_quality
            )));
        }
        if o.copies == 0 {
            return Err(Html2PdfError::InvalidOptions("copies must be ≥ 1".into()));
        }
        if o.concurrency == 0 {
            return Err(Html2PdfError::InvalidOptions(
                "concurrency must be ≥ 1".into(),
            ));
        }
        if let Some((w, h)) = o.page_dimensions_mm {
            if w == 0 || h == 0 {
                return Err(Html2PdfError::InvalidOptions(format!(
                    "page dimensions must be non-zero, got {w}mm × {h}mm"
                )));
            }
        }
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_produce_minimal_args() {
        let args = RenderOptions::default().to_args();
        assert_eq!(
            args,
            vec!["--quiet", "--page-size", "A4"],
            "defaults should map to engine defaults plus quiet"
        );
    }

    #[test]
    fn full_demo_options_map_to_flags() {
        let opts = RenderOptions::builder()
            .image_quality(80)
            .print_background(false)
            .load_images(false)
            .pdf_compression(false)
            .external_links(false)
            .internal_links(false)
            .title("This is a sample PDF document")
            .low_quality(true)
            .copies(2)
            .grayscale(true)
            .replace("name", "Sample 1")
            .page_offset(2)
            .margins_mm(10, 10, 10, 10)
            .page_dimensions_mm(210, 297)
            .orientation(PageOrientation::Landscape)
            .smart_shrinking(false)
            .forms(true)
            .header(PageBand {
                text: "Header Text Sample 1".into(),
                alignment: TextAlignment::Center,
                font_name: "Verdana".into(),
                font_size: 15,
                line: true,
                spacing_mm: 23,
            })
            .timeout_ms(10_000)
            .build()
            .unwrap();

        let args = opts.to_args();
        let has = |flag: &str| args.iter().any(|a| a == flag);

        assert!(has("--image-quality"));
        assert!(has("--no-background"));
        assert!(has("--no-images"));
        assert!(has("--no-pdf-compression"));
        assert!(has("--disable-external-links"));
        assert!(has("--disable-internal-links"));
        assert!(has("--lowquality"));
        assert!(has("--copies"));
        assert!(has("--grayscale"));
        assert!(has("--replace"));
        assert!(has("--page-offset"));
        assert!(has("--margin-top"));
        assert!(has("--orientation"));
        assert!(has("--disable-smart-shrinking"));
        assert!(has("--enable-forms"));
        assert!(has("--header-center"));
        assert!(has("--header-line"));
        assert!(has("--header-spacing"));
        // Timeout is engine-wrapper enforced, never a flag.
        assert!(!args.iter().any(|a| a.contains("timeout")));
    }

    #[test]
    fn dimension_pair_wins_over_page_size() {
        let opts = RenderOptions::builder()
            .page_size(PageSize::Letter)
            .page_dimensions_mm(210, 297)
            .build()
            .unwrap();
        let args = opts.to_args();
        assert!(args.contains(&"--page-width".to_string()));
        assert!(args.contains(&"210mm".to_string()));
        assert!(!args.contains(&"--page-size".to_string()));
    }

    #[test]
    fn page_size_used_without_dimensions() {
        let opts = RenderOptions::builder()
            .page_size(PageSize::Letter)
            .build()
            .unwrap();
        let args = opts.to_args();
        assert!(args.contains(&"--page-size".to_string()));
        assert!(args.contains(&"Letter".to_string()));
    }

    #[test]
    fn setters_clamp_instead_of_failing() {
        let opts = RenderOptions::builder()
            .image_quality(200)
            .copies(0)
            .concurrency(0)
            .build()
            .unwrap();
        assert_eq!(opts.image_quality, 100);
        assert_eq!(opts.copies, 1);
        assert_eq!(opts.concurrency, 1);
    }

    #[test]
    fn zero_page_dimensions_rejected() {
        let err = RenderOptions::builder()
            .page_dimensions_mm(0, 297)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("non-zero"));
    }

    #[test]
    fn replacements_keep_insertion_order() {
        let opts = RenderOptions::builder()
            .replace("a", "1")
            .replace("b", "2")
            .build()
            .unwrap();
        let args = opts.to_args();
        let first = args.iter().position(|a| a == "a").unwrap();
        let second = args.iter().position(|a| a == "b").unwrap();
        assert!(first < second);
    }

    #[test]
    fn args_are_deterministic() {
        let opts = RenderOptions::builder()
            .grayscale(true)
            .margins_mm(5, 5, 5, 5)
            .build()
            .unwrap();
        assert_eq!(opts.to_args(), opts.to_args());
    }
}

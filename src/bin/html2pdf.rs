//! CLI binary for html2pdf-batch.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `RenderOptions`, assembles jobs from files, URLs, or a template plus
//! model, and reports per-job results.

use anyhow::{Context, Result};
use clap::Parser;
use html2pdf_batch::{
    convert_batch_to_dir, convert_batch_with_engine, convert_to_file_with_engine, is_url,
    BatchOutput, BatchProgressCallback, ConversionJob, PageBand, PageOrientation, PageSize,
    PdfEngine, ProgressCallback, RenderOptions, WkhtmltopdfEngine,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live progress bar plus one log line per
/// job. Works correctly when jobs complete out of order (concurrent mode).
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} jobs  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_jobs: usize) {
        self.bar.set_length(total_jobs as u64);
    }

    fn on_job_complete(&self, index: usize, total: usize, pdf_len: usize) {
        self.bar.println(format!(
            "  {} Job {:>3}/{:<3}  {}",
            green("✓"),
            index + 1,
            total,
            dim(&format!("{pdf_len:>8} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_job_error(&self, index: usize, total: usize, reason: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if reason.len() > 100 {
            let mut end = 99;
            while !reason.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}\u{2026}", &reason[..end])
        } else {
            reason.to_string()
        };

        self.bar.println(format!(
            "  {} Job {:>3}/{:<3}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_jobs: usize, success_count: usize) {
        let failed = total_jobs.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} jobs converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} jobs converted  ({} failed)",
                if failed == total_jobs {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_jobs,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a local HTML file (PDF on stdout)
  html2pdf page.html > page.pdf

  # Convert to a named file
  html2pdf page.html -o page.pdf

  # Convert a web page
  html2pdf https://example.com -o example.pdf

  # Read markup from stdin
  cat page.html | html2pdf - -o page.pdf

  # Batch: several inputs into a directory
  html2pdf a.html b.html https://example.com --out-dir pdfs/ --stem doc

  # Template + JSON model (an array model produces one PDF per element)
  html2pdf --template invoice.html --model orders.json --out-dir invoices/

  # Landscape, grayscale, custom margins
  html2pdf page.html -o out.pdf --orientation landscape --grayscale --margin-mm 10

  # Four parallel engine processes
  html2pdf *.html --out-dir pdfs/ --concurrency 4

  # Machine-readable per-job report
  html2pdf a.html b.html --out-dir pdfs/ --json > report.json

EXIT STATUS:
  0  every job produced a PDF
  1  at least one job failed (per-job reasons on stderr or in --json),
     or a fatal error stopped the run before any conversion

ENVIRONMENT VARIABLES:
  WKHTMLTOPDF_PATH   Path to the wkhtmltopdf binary (default: found on PATH)

SETUP:
  The wkhtmltopdf binary does the actual rendering and must be installed
  separately: https://wkhtmltopdf.org/downloads.html
"#;

/// Convert HTML files, URLs, and templates to PDF in batches.
#[derive(Parser, Debug)]
#[command(
    name = "html2pdf",
    version,
    about = "Convert HTML files, URLs, and templates to PDF in batches",
    long_about = "Convert HTML to PDF through the wkhtmltopdf engine. Inputs can be local \
HTML files, http/https URLs, `-` for stdin, or a Tera template rendered against a JSON \
model. Each job in a batch succeeds or fails on its own; one bad input never aborts the \
rest.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// HTML files, http/https URLs, or `-` for stdin.
    inputs: Vec<String>,

    /// Write the PDF to this file (single job only).
    #[arg(short, long, conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Write one PDF per job into this directory, named `<stem><index>.pdf`.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Filename stem for --out-dir outputs.
    #[arg(long, default_value = "document")]
    stem: String,

    /// Tera template file; rendered against --model before conversion.
    #[arg(long, conflicts_with = "inputs", requires = "model")]
    template: Option<PathBuf>,

    /// JSON model file for --template. A top-level array produces one job
    /// per element; any other value produces a single job.
    #[arg(long, requires = "template")]
    model: Option<PathBuf>,

    /// Path to the wkhtmltopdf binary.
    #[arg(long, env = "WKHTMLTOPDF_PATH")]
    engine_path: Option<PathBuf>,

    /// Number of jobs converted in parallel.
    #[arg(short, long, default_value_t = 1)]
    concurrency: usize,

    /// Per-job conversion timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Page orientation: portrait or landscape.
    #[arg(long, value_enum, default_value = "portrait")]
    orientation: OrientationArg,

    /// Page size: a3, a4, a5, letter, legal.
    #[arg(long, value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Uniform page margin in millimetres (all four sides).
    #[arg(long)]
    margin_mm: Option<u32>,

    /// JPEG quality for re-compressed images (0-100).
    #[arg(long, default_value_t = 94)]
    image_quality: u8,

    /// Title of the generated PDF.
    #[arg(long)]
    title: Option<String>,

    /// Render in grayscale.
    #[arg(long)]
    grayscale: bool,

    /// Generate in lower quality (smaller, faster).
    #[arg(long)]
    lowquality: bool,

    /// Do not print CSS backgrounds.
    #[arg(long)]
    no_background: bool,

    /// Do not load or print images.
    #[arg(long)]
    no_images: bool,

    /// Header text. Supports [page]/[topage] substitution.
    #[arg(long)]
    header_text: Option<String>,

    /// Footer text. Supports [page]/[topage] substitution.
    #[arg(long)]
    footer_text: Option<String>,

    /// Print a per-job JSON report to stdout instead of human output.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for PageOrientation {
    fn from(v: OrientationArg) -> Self {
        match v {
            OrientationArg::Portrait => PageOrientation::Portrait,
            OrientationArg::Landscape => PageOrientation::Landscape,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageSizeArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A3 => PageSize::A3,
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::A5 => PageSize::A5,
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::Legal => PageSize::Legal,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let single_to_stdout =
        cli.output.is_none() && cli.out_dir.is_none() && !cli.json && job_count_hint(&cli) == 1;
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !single_to_stdout;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Assemble jobs ────────────────────────────────────────────────────
    let jobs = build_jobs(&cli).await?;
    if jobs.is_empty() {
        anyhow::bail!("no inputs given (see --help)");
    }
    // Refuse to convert into the void: without a destination, batch
    // payloads (and --json run payloads) would be dropped after
    // conversion. Only a single non-JSON job can go to stdout.
    if needs_destination(cli.output.is_some(), cli.out_dir.is_some(), cli.json, jobs.len()) {
        anyhow::bail!(
            "no destination for {} converted PDF(s); use -o <file> for a single job or --out-dir <dir> for a batch",
            jobs.len()
        );
    }

    // ── Build options and engine ─────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };
    let options = build_options(&cli, progress_cb)?;

    let engine: Arc<dyn PdfEngine> = match cli.engine_path {
        Some(ref path) => Arc::new(WkhtmltopdfEngine::with_binary(path)),
        None => Arc::new(WkhtmltopdfEngine::new()),
    };

    // ── Run conversion ───────────────────────────────────────────────────
    let output = if let Some(ref output_path) = cli.output {
        if jobs.len() > 1 {
            anyhow::bail!("-o/--output takes a single job; use --out-dir for batches");
        }
        let bytes = convert_to_file_with_engine(&jobs[0], output_path, &options, &engine)
            .await
            .context("Conversion failed")?;
        if !cli.quiet && !cli.json {
            eprintln!(
                "{}  {}  →  {}",
                green("✔"),
                dim(&format!("{bytes} bytes")),
                bold(&output_path.display().to_string()),
            );
        }
        return Ok(());
    } else if let Some(ref dir) = cli.out_dir {
        convert_batch_to_dir(&jobs, dir, &cli.stem, &options, &engine)
            .await
            .context("Batch conversion failed")?
    } else {
        // The destination guard above leaves exactly one case here: a
        // single non-JSON job, whose PDF bytes go to stdout.
        let output = convert_batch_with_engine(&jobs, &options, &engine).await;
        match output.outcomes[0].pdf() {
            Some(pdf) => {
                io::stdout()
                    .lock()
                    .write_all(pdf)
                    .context("Failed to write PDF to stdout")?;
                return Ok(());
            }
            None => {
                eprintln!("{} {}", red("✘"), output.outcomes[0].error().unwrap());
                std::process::exit(1);
            }
        }
    };

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        print_json_report(&jobs, &output, cli.out_dir.as_deref(), &cli.stem)?;
    } else if !cli.quiet && !show_progress {
        // Only print inline results when the progress callback is disabled.
        for (index, error) in output.failures() {
            eprintln!("  {} job {index}: {error}", red("✗"));
        }
        eprintln!(
            "Converted {}/{} jobs in {}ms",
            output.stats.succeeded, output.stats.total_jobs, output.stats.total_duration_ms
        );
    }

    if !output.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

/// True when the run has nowhere to put its PDFs and must be refused.
///
/// Batches of two or more need `--out-dir`; `--json` runs need a file
/// destination too, because the report occupies stdout. The only
/// destination-free run allowed is a single non-JSON job, which streams
/// its PDF to stdout.
fn needs_destination(has_output: bool, has_out_dir: bool, json: bool, job_count: usize) -> bool {
    !has_output && !has_out_dir && (job_count > 1 || json)
}

/// Job count before inputs are read, for output-mode decisions.
fn job_count_hint(cli: &Cli) -> usize {
    if cli.template.is_some() {
        // Unknown until the model file is read; treat as a batch.
        2
    } else {
        cli.inputs.len()
    }
}

/// Assemble the job list from CLI inputs.
async fn build_jobs(cli: &Cli) -> Result<Vec<ConversionJob>> {
    if let Some(ref template_path) = cli.template {
        let source = tokio::fs::read_to_string(template_path)
            .await
            .with_context(|| format!("Failed to read template {:?}", template_path))?;

        let model_path = cli.model.as_ref().expect("clap enforces --model");
        let model_text = tokio::fs::read_to_string(model_path)
            .await
            .with_context(|| format!("Failed to read model {:?}", model_path))?;
        let model: serde_json::Value = serde_json::from_str(&model_text)
            .with_context(|| format!("Model {:?} is not valid JSON", model_path))?;

        return Ok(match model {
            serde_json::Value::Array(models) => ConversionJob::template_batch(source, models),
            other => vec![ConversionJob::template(source, other)],
        });
    }

    let mut jobs = Vec::with_capacity(cli.inputs.len());
    for input in &cli.inputs {
        if input == "-" {
            let mut html = String::new();
            io::stdin()
                .read_to_string(&mut html)
                .context("Failed to read markup from stdin")?;
            jobs.push(ConversionJob::inline(html));
        } else if is_url(input) {
            jobs.push(ConversionJob::url(input));
        } else {
            let html = tokio::fs::read_to_string(input)
                .await
                .with_context(|| format!("Failed to read input file '{input}'"))?;
            jobs.push(ConversionJob::inline(html));
        }
    }
    Ok(jobs)
}

/// Map CLI args to `RenderOptions`.
fn build_options(cli: &Cli, progress: Option<ProgressCallback>) -> Result<RenderOptions> {
    let mut builder = RenderOptions::builder()
        .orientation(cli.orientation.into())
        .page_size(cli.page_size.into())
        .image_quality(cli.image_quality)
        .grayscale(cli.grayscale)
        .low_quality(cli.lowquality)
        .print_background(!cli.no_background)
        .load_images(!cli.no_images)
        .timeout_ms(cli.timeout.saturating_mul(1000))
        .concurrency(cli.concurrency);

    if let Some(mm) = cli.margin_mm {
        builder = builder.margins_mm(mm, mm, mm, mm);
    }
    if let Some(ref title) = cli.title {
        builder = builder.title(title);
    }
    if let Some(ref text) = cli.header_text {
        builder = builder.header(PageBand::text(text));
    }
    if let Some(ref text) = cli.footer_text {
        builder = builder.footer(PageBand::text(text));
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid options")
}

/// Machine-readable per-job report on stdout. PDF payloads are never
/// inlined; successful jobs reference their output path when one exists.
fn print_json_report(
    jobs: &[ConversionJob],
    output: &BatchOutput,
    out_dir: Option<&std::path::Path>,
    stem: &str,
) -> Result<()> {
    let report = serde_json::json!({
        "stats": output.stats,
        "jobs": output
            .outcomes
            .iter()
            .enumerate()
            .map(|(index, outcome)| {
                let path = out_dir.map(|d| {
                    html2pdf_batch::convert::job_output_path(d, stem, index)
                        .display()
                        .to_string()
                });
                match outcome.error() {
                    None => serde_json::json!({
                        "index": index,
                        "kind": jobs[index].kind(),
                        "status": "success",
                        "pdf_bytes": outcome.pdf().map(<[u8]>::len),
                        "duration_ms": outcome.duration_ms(),
                        "path": path,
                    }),
                    Some(error) => serde_json::json!({
                        "index": index,
                        "kind": jobs[index].kind(),
                        "status": "failure",
                        "error_class": error.class(),
                        "error": error.to_string(),
                        "duration_ms": outcome.duration_ms(),
                    }),
                }
            })
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

//! CLI binary for pdf-flipbook.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_flipbook::{
    convert, count_pages, ConversionConfig, ConversionProgressCallback, ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while pdftoppm renders, then a bar
/// advancing once per page.
struct CliProgressCallback {
    bar: ProgressBar,
    missing: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Counting pages…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            missing: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once rendering is done.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.bar.set_prefix("Rendering");
        self.bar
            .set_message(format!("{total_pages} pages with pdftoppm…"));
    }

    fn on_render_complete(&self, total_pages: usize) {
        self.activate_bar(total_pages);
    }

    fn on_page_complete(&self, page_num: usize, total: usize, file_size: u64) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{:.1} KB", file_size as f64 / 1024.0)),
        ));
        self.bar.inc(1);
    }

    fn on_page_missing(&self, page_num: usize, total: usize) {
        self.missing.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            yellow("⚠"),
            page_num,
            total,
            yellow("not rendered, skipped"),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let missing = self.missing.load(Ordering::SeqCst);
        if missing == 0 {
            eprintln!(
                "{} {} pages converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages converted  ({} missing)",
                cyan("⚠"),
                bold(&success_count.to_string()),
                total_pages,
                yellow(&missing.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert with defaults (150 DPI, quality 85) into ./book_flipbook
  pdf2flipbook book.pdf

  # Choose the output directory
  pdf2flipbook book.pdf ./output

  # Sharper pages, smaller files, four encoder threads
  pdf2flipbook --dpi 200 --quality 75 --jobs 4 book.pdf

  # Only report the page count
  pdf2flipbook --count-only book.pdf

  # Machine-readable page list
  pdf2flipbook --json book.pdf > pages.json

OUTPUT:
  <output>/files/page/001.webp, 002.webp, …   one image per page

REQUIREMENTS:
  pdftoppm (poppler-utils) must be installed, or pointed to with
  --pdftoppm <PATH> / PDFTOPPM_BIN.
"#;

/// Render PDF pages into WebP images for an offline flipbook viewer.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2flipbook",
    version,
    about = "Render PDF pages into WebP images for an offline flipbook viewer",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF file.
    pdf: PathBuf,

    /// Output directory (default: ./<pdf-stem>_flipbook).
    output: Option<PathBuf>,

    /// Rendering DPI (36–600).
    #[arg(long, env = "PDF2FLIPBOOK_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(36..=600))]
    dpi: u32,

    /// WebP quality (0–100).
    #[arg(short, long, env = "PDF2FLIPBOOK_QUALITY", default_value_t = 85,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: u8,

    /// Pages encoded in parallel.
    #[arg(short, long, env = "PDF2FLIPBOOK_JOBS", default_value_t = 1)]
    jobs: usize,

    /// Path to the pdftoppm binary.
    #[arg(long, env = "PDFTOPPM_BIN")]
    pdftoppm: Option<PathBuf>,

    /// Abort if the full render takes longer than this many seconds.
    #[arg(long, env = "PDF2FLIPBOOK_RENDER_TIMEOUT")]
    render_timeout: Option<u64>,

    /// Do not delete an existing output directory first.
    #[arg(long)]
    keep_existing: bool,

    /// Print the page count only, no conversion.
    #[arg(long)]
    count_only: bool,

    /// Output structured JSON (ConversionOutput) instead of a summary.
    #[arg(long, env = "PDF2FLIPBOOK_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2FLIPBOOK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2FLIPBOOK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(long, env = "PDF2FLIPBOOK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level per-page logs; warnings still show.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.count_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress || cli.json {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Count-only mode ──────────────────────────────────────────────────
    if cli.count_only {
        let pages = count_pages(&cli.pdf, &config)
            .await
            .context("Failed to count pages")?;
        if cli.json {
            println!("{}", serde_json::json!({ "pages": pages }));
        } else {
            println!("{pages}");
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_dir(&cli.pdf));

    let output = convert(&cli.pdf, &output_dir, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {}/{} pages  {:.1} MB  {}ms  →  {}",
            if stats.missing_pages == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.converted_pages,
            stats.total_pages,
            stats.total_size_bytes as f64 / (1024.0 * 1024.0),
            stats.total_duration_ms,
            bold(&output.output_dir.join("files/page").display().to_string()),
        );
        for missing in &output.missing_pages {
            eprintln!("   {}", dim(&missing.to_string()));
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .quality(cli.quality)
        .concurrency(cli.jobs)
        .clean_output(!cli.keep_existing);

    if let Some(ref path) = cli.pdftoppm {
        builder = builder.pdftoppm_path(path);
    }
    if let Some(secs) = cli.render_timeout {
        builder = builder.render_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// `<cwd>/<pdf-stem>_flipbook`.
fn default_output_dir(pdf: &Path) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    PathBuf::from(format!("{stem}_flipbook"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_dir_uses_stem() {
        assert_eq!(
            default_output_dir(Path::new("/books/Los Caminantes.pdf")),
            PathBuf::from("Los Caminantes_flipbook")
        );
    }

    #[test]
    fn parses_positional_arguments_and_flags() {
        let cli = Cli::try_parse_from([
            "pdf2flipbook",
            "book.pdf",
            "out",
            "--dpi",
            "200",
            "-q",
            "70",
            "--jobs",
            "4",
            "--keep-existing",
        ])
        .unwrap();
        assert_eq!(cli.pdf, PathBuf::from("book.pdf"));
        assert_eq!(cli.output, Some(PathBuf::from("out")));

        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.dpi, 200);
        assert_eq!(config.quality, 70);
        assert_eq!(config.concurrency, 4);
        assert!(!config.clean_output);
    }

    #[test]
    fn rejects_out_of_range_quality() {
        assert!(Cli::try_parse_from(["pdf2flipbook", "book.pdf", "-q", "101"]).is_err());
    }

    #[test]
    fn zero_render_timeout_is_invalid() {
        let cli =
            Cli::try_parse_from(["pdf2flipbook", "book.pdf", "--render-timeout", "0"]).unwrap();
        assert!(build_config(&cli, None).is_err());
    }
}

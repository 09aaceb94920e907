//! Conversion entry points.
//!
//! [`convert`] wires the production capabilities (`pdftoppm`, WebP) into the
//! two pipeline components. [`convert_with`] takes them as arguments, which
//! is how tests and embedders plug in their own rasterizer or encoder.

use crate::config::ConversionConfig;
use crate::error::FlipbookError;
use crate::output::{calculate_total_size, ConversionOutput, ConversionStats, OutputLayout};
use crate::pipeline::compress::{ImageCompressor, WebpCompressor};
use crate::pipeline::input;
use crate::pipeline::probe::PageCountProber;
use crate::pipeline::rasterize::{PdftoppmRasterizer, Rasterizer};
use crate::pipeline::render::{PageRenderPipeline, RenderJob};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Convert a PDF into flipbook page images under `output_dir/files/page/`.
///
/// # Returns
/// `Ok(ConversionOutput)` on success, even if the rasterizer skipped some
/// pages (check `output.missing_pages`).
///
/// # Errors
/// Returns `Err(FlipbookError)` only for fatal errors:
/// - File not found / permission denied / not a PDF
/// - The rasterizer could not run or exited unsuccessfully
/// - A rendered page could not be converted
pub async fn convert(
    pdf_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, FlipbookError> {
    let rasterizer: Arc<dyn Rasterizer> = Arc::new(PdftoppmRasterizer::from_config(config));
    let compressor: Arc<dyn ImageCompressor> = Arc::new(WebpCompressor);
    convert_with(rasterizer, compressor, pdf_path, output_dir, config).await
}

/// [`convert`] with caller-supplied capabilities.
pub async fn convert_with(
    rasterizer: Arc<dyn Rasterizer>,
    compressor: Arc<dyn ImageCompressor>,
    pdf_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, FlipbookError> {
    let total_start = Instant::now();

    // ── Step 1: Validate input ───────────────────────────────────────────
    let pdf_path = input::validate_input(pdf_path)?;
    let layout = OutputLayout::new(input::absolutize(output_dir.as_ref()));
    info!(
        "Converting {} → {}",
        pdf_path.display(),
        layout.root().display()
    );

    // ── Step 2: Prepare output directory ─────────────────────────────────
    prepare_output(&layout, &pdf_path, config.clean_output).await?;

    // ── Step 3: Probe page count ─────────────────────────────────────────
    let probe_start = Instant::now();
    let prober = PageCountProber::new(Arc::clone(&rasterizer), config.probe_dpi);
    let page_count = prober.count_pages(&pdf_path, &layout.probe_dir()).await;
    let probe_duration_ms = probe_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(page_count);
    }

    // ── Step 4: Render and convert pages ─────────────────────────────────
    let render_start = Instant::now();
    let job = RenderJob {
        pdf_path: pdf_path.clone(),
        pages_dir: layout.pages_dir(),
        render_dir: layout.render_dir(),
        dpi: config.dpi,
        quality: config.quality,
        page_count,
        concurrency: config.concurrency,
        progress: config.progress_callback.clone(),
    };
    let rendered = PageRenderPipeline::new(rasterizer, compressor)
        .run(&job)
        .await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    // ── Step 5: Compute stats ────────────────────────────────────────────
    let stats = ConversionStats {
        total_pages: page_count,
        converted_pages: rendered.pages.len(),
        missing_pages: rendered.missing.len(),
        total_size_bytes: calculate_total_size(&rendered.pages),
        probe_duration_ms,
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    if !rendered.missing.is_empty() {
        warn!(
            "{} of {} pages were not rendered and are missing from the flipbook",
            stats.missing_pages, page_count
        );
    }
    info!(
        "Conversion complete: {}/{} pages, {:.1} MB, {}ms total",
        stats.converted_pages,
        page_count,
        stats.total_size_bytes as f64 / (1024.0 * 1024.0),
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(page_count, stats.converted_pages);
    }

    Ok(ConversionOutput {
        output_dir: layout.root().to_path_buf(),
        pages: rendered.pages,
        missing_pages: rendered.missing,
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    pdf_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, FlipbookError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FlipbookError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(pdf_path, output_dir, config))
}

/// Distinguishes concurrent `count_pages` scratch directories within one process.
static PROBE_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Count the pages of a PDF without converting anything.
///
/// Uses the same best-effort probe as [`convert`]; the scratch directory
/// lives in the system temp directory and is removed afterwards.
pub async fn count_pages(
    pdf_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<usize, FlipbookError> {
    let pdf_path = input::validate_input(pdf_path)?;
    let rasterizer: Arc<dyn Rasterizer> = Arc::new(PdftoppmRasterizer::from_config(config));
    let scratch = std::env::temp_dir().join(format!(
        "pdf-flipbook-probe-{}-{}",
        std::process::id(),
        PROBE_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    Ok(PageCountProber::new(rasterizer, config.probe_dpi)
        .count_pages(&pdf_path, &scratch)
        .await)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Optionally wipe the output root, then create the pages directory.
async fn prepare_output(
    layout: &OutputLayout,
    pdf_path: &Path,
    clean: bool,
) -> Result<(), FlipbookError> {
    let root = layout.root();

    if clean && tokio::fs::try_exists(root).await.unwrap_or(false) {
        // Compare resolved paths so `..` components and symlinks cannot hide the input.
        let real_root = tokio::fs::canonicalize(root)
            .await
            .unwrap_or_else(|_| root.to_path_buf());
        let real_pdf = tokio::fs::canonicalize(pdf_path)
            .await
            .unwrap_or_else(|_| pdf_path.to_path_buf());
        if real_pdf.starts_with(&real_root) {
            return Err(FlipbookError::InvalidConfig(format!(
                "output directory '{}' contains the input PDF; refusing to delete it",
                root.display()
            )));
        }
        info!("Removing existing output directory {}", root.display());
        tokio::fs::remove_dir_all(root)
            .await
            .map_err(|e| FlipbookError::OutputWriteFailed {
                path: root.to_path_buf(),
                source: e,
            })?;
    }

    let pages_dir = layout.pages_dir();
    tokio::fs::create_dir_all(&pages_dir)
        .await
        .map_err(|e| FlipbookError::OutputWriteFailed {
            path: pages_dir,
            source: e,
        })
}

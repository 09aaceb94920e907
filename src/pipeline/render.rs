//! Full-resolution render and per-page conversion.
//!
//! ## Stages
//!
//! ```text
//! Rendering ─▶ PaddingDetection ─▶ ConvertingPages(1..=N) ─▶ Cleanup
//!     │                                   │
//!     └──────── fatal error ──────────────┴──▶ Cleanup ─▶ Err
//! ```
//!
//! The rasterizer runs once for the whole document. Its output width is read
//! back once, then every page is looked up with that convention. A page with
//! no intermediate file is skipped with a warning. A page whose file exists
//! but cannot be converted aborts the run: pages not yet started are
//! cancelled, running ones are awaited, and output for pages after the
//! failing one is removed. The temp directory is a [`ScratchDir`], so it is
//! removed on every exit path.

use super::compress::ImageCompressor;
use super::padding::{PaddingSource, RasterNaming};
use super::rasterize::Rasterizer;
use super::scratch::ScratchDir;
use crate::error::{FlipbookError, PageError};
use crate::output::{page_file_name, PageRecord};
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// File prefix used for full-resolution output (`page-01.png`, …).
pub const RENDER_PREFIX: &str = "page";

/// Everything one pipeline run needs.
#[derive(Clone)]
pub struct RenderJob {
    pub pdf_path: PathBuf,
    /// Destination for the final page images.
    pub pages_dir: PathBuf,
    /// Scratch directory for the rasterizer's output.
    pub render_dir: PathBuf,
    pub dpi: u32,
    /// 0–100.
    pub quality: u8,
    /// Page count obtained from the probe.
    pub page_count: usize,
    /// Pages compressed at the same time (≥ 1).
    pub concurrency: usize,
    pub progress: Option<ProgressCallback>,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RenderedPages {
    /// Converted pages, ascending by page number.
    pub pages: Vec<PageRecord>,
    /// Pages the rasterizer did not produce, ascending.
    pub missing: Vec<PageError>,
    /// Convention used to find the intermediate files.
    pub naming: RasterNaming,
}

/// Outcome for a single page.
enum PageOutcome {
    Converted(PageRecord),
    Missing(PageError),
    /// Not started because an earlier page failed.
    Cancelled,
}

/// Renders a PDF and converts each page with the injected capabilities.
#[derive(Clone)]
pub struct PageRenderPipeline {
    rasterizer: Arc<dyn Rasterizer>,
    compressor: Arc<dyn ImageCompressor>,
}

impl PageRenderPipeline {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, compressor: Arc<dyn ImageCompressor>) -> Self {
        Self {
            rasterizer,
            compressor,
        }
    }

    /// Run the pipeline for `job`.
    ///
    /// # Errors
    /// Rasterizer failures and the first conversion failure are returned as
    /// is; no partial page list is returned in that case.
    pub async fn run(&self, job: &RenderJob) -> Result<RenderedPages, FlipbookError> {
        let total = job.page_count.max(1);

        tokio::fs::create_dir_all(&job.pages_dir)
            .await
            .map_err(|e| FlipbookError::OutputWriteFailed {
                path: job.pages_dir.clone(),
                source: e,
            })?;

        // ── Rendering ────────────────────────────────────────────────────
        let scratch = ScratchDir::fresh(&job.render_dir).await?;
        let prefix = scratch.path().join(RENDER_PREFIX);
        info!(
            "Rendering {} pages at {} DPI with {}",
            total,
            job.dpi,
            self.rasterizer.name()
        );
        if let Err(e) = self
            .rasterizer
            .rasterize(&job.pdf_path, job.dpi, &prefix)
            .await
        {
            scratch.remove().await;
            return Err(e);
        }
        if let Some(ref cb) = job.progress {
            cb.on_render_complete(total);
        }

        // ── Padding detection (once per run) ─────────────────────────────
        let names = scratch.file_names().await.unwrap_or_else(|e| {
            debug!("Could not list {}: {}", scratch.path().display(), e);
            Vec::new()
        });
        let naming = RasterNaming::detect(
            &names,
            RENDER_PREFIX,
            self.rasterizer.extension(),
            total,
        );
        match naming.source {
            PaddingSource::Detected => debug!("Detected {}-digit page numbers", naming.width),
            PaddingSource::Fallback => debug!(
                "No rendered files listed; assuming {}-digit page numbers",
                naming.width
            ),
        }

        // ── Converting pages ─────────────────────────────────────────────
        // After the first failure no new page starts, but conversions that
        // are already on the blocking pool are awaited so nothing writes to
        // `pages_dir` or reads `.temp` once this returns.
        let aborted = AtomicBool::new(false);
        let mut results = stream::iter(1..=total)
            .map(|page| self.convert_page(job, scratch.path(), &naming, page, total, &aborted))
            .buffered(job.concurrency.max(1));

        let mut outcomes = Vec::with_capacity(total);
        let mut failure: Option<(usize, FlipbookError)> = None;
        let mut page = 0;
        while let Some(result) = results.next().await {
            page += 1;
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    aborted.store(true, Ordering::SeqCst);
                    if failure.is_none() {
                        failure = Some((page, e));
                    }
                }
            }
        }
        drop(results);

        if let Some((failed_page, err)) = failure {
            // Keep what a sequential run would have left behind.
            for outcome in outcomes {
                if let PageOutcome::Converted(record) = outcome {
                    if record.page_number > failed_page {
                        let _ = tokio::fs::remove_file(&record.file_path).await;
                    }
                }
            }
            scratch.remove().await;
            return Err(err);
        }

        let mut pages = Vec::with_capacity(outcomes.len());
        let mut missing = Vec::new();
        for outcome in outcomes {
            match outcome {
                PageOutcome::Converted(record) => pages.push(record),
                PageOutcome::Missing(err) => missing.push(err),
                PageOutcome::Cancelled => {}
            }
        }

        info!("Converted {}/{} pages", pages.len(), total);

        // ── Cleanup ──────────────────────────────────────────────────────
        scratch.remove().await;

        Ok(RenderedPages {
            pages,
            missing,
            naming,
        })
    }

    async fn convert_page(
        &self,
        job: &RenderJob,
        render_dir: &Path,
        naming: &RasterNaming,
        page: usize,
        total: usize,
        aborted: &AtomicBool,
    ) -> Result<PageOutcome, FlipbookError> {
        if aborted.load(Ordering::SeqCst) {
            return Ok(PageOutcome::Cancelled);
        }
        let raster = render_dir.join(naming.file_name(page));

        if !tokio::fs::try_exists(&raster).await.unwrap_or(false) {
            warn!(
                "Rendered file not found for page {}/{}: {}",
                page,
                total,
                raster.display()
            );
            if let Some(ref cb) = job.progress {
                cb.on_page_missing(page, total);
            }
            return Ok(PageOutcome::Missing(PageError::MissingRaster {
                page,
                total,
                expected: raster,
            }));
        }

        let output = job
            .pages_dir
            .join(page_file_name(page, self.compressor.extension()));

        let compressor = Arc::clone(&self.compressor);
        let quality = job.quality;
        let (src, dst) = (raster.clone(), output.clone());
        tokio::task::spawn_blocking(move || compressor.compress(&src, &dst, quality))
            .await
            .map_err(|e| FlipbookError::Internal(format!("Conversion task panicked: {}", e)))?
            .map_err(|e| FlipbookError::ConversionFailed {
                page,
                path: raster.clone(),
                detail: e.to_string(),
            })?;

        let file_size = tokio::fs::metadata(&output)
            .await
            .map_err(|e| FlipbookError::OutputWriteFailed {
                path: output.clone(),
                source: e,
            })?
            .len();

        info!(
            "Page {}/{} ({:.1}%) - {:.1} KB",
            page,
            total,
            page as f64 / total as f64 * 100.0,
            file_size as f64 / 1024.0
        );
        if let Some(ref cb) = job.progress {
            cb.on_page_complete(page, total, file_size);
        }

        Ok(PageOutcome::Converted(PageRecord {
            page_number: page,
            file_size,
            file_path: output,
        }))
    }
}

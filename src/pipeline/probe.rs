//! Page counting by trial render.
//!
//! No PDF parser is involved: the rasterizer renders the document at a very
//! low resolution into a scratch directory and we count what it wrote.
//! Probing is best effort. Any failure, including a missing binary, resolves
//! to a count of 1 so the caller still attempts at least one page; hard
//! input validation happens before the probe runs.

use super::padding::count_raster_files;
use super::rasterize::Rasterizer;
use super::scratch::ScratchDir;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// File prefix used for probe output (`test-1.png`, …).
pub const PROBE_PREFIX: &str = "test";

/// Determines how many pages a PDF has.
#[derive(Clone)]
pub struct PageCountProber {
    rasterizer: Arc<dyn Rasterizer>,
    dpi: u32,
}

impl PageCountProber {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, dpi: u32) -> Self {
        Self { rasterizer, dpi }
    }

    /// Count the pages of `pdf_path`, using `scratch_dir` for the trial render.
    ///
    /// Always returns at least 1. `scratch_dir` is recreated empty and is
    /// gone again when this returns.
    pub async fn count_pages(&self, pdf_path: &Path, scratch_dir: &Path) -> usize {
        let scratch = match ScratchDir::fresh(scratch_dir).await {
            Ok(s) => s,
            Err(e) => {
                warn!("Page-count probe could not prepare scratch directory: {}", e);
                return 1;
            }
        };

        let prefix = scratch.path().join(PROBE_PREFIX);
        if let Err(e) = self.rasterizer.rasterize(pdf_path, self.dpi, &prefix).await {
            // The files written before a failure still count.
            debug!("Probe render with {} failed: {}", self.rasterizer.name(), e);
        }

        let count = match scratch.file_names().await {
            Ok(names) => count_raster_files(&names, PROBE_PREFIX, self.rasterizer.extension()),
            Err(e) => {
                debug!("Could not list probe output: {}", e);
                0
            }
        };
        scratch.remove().await;

        if count == 0 {
            debug!("Probe produced no pages; assuming 1");
            return 1;
        }

        info!("PDF has {} pages", count);
        count
    }
}

//! Output types: page records, run statistics and the on-disk layout.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory (relative to the output root) that holds the page images.
pub const PAGES_SUBDIR: &str = "files/page";

/// One successfully converted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// 1-indexed page number.
    pub page_number: usize,
    /// Size in bytes of the written image.
    pub file_size: u64,
    /// Absolute path of the written image (`<root>/files/page/007.webp`).
    pub file_path: PathBuf,
}

impl PageRecord {
    /// The reference a viewer uses for this page: `files/page/<NNN>.<ext>`.
    pub fn relative_path(&self) -> String {
        let ext = self
            .file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        format!("{}/{}", PAGES_SUBDIR, page_file_name(self.page_number, ext))
    }
}

/// Final file name for a page: 3-digit zero-padded number plus extension.
pub fn page_file_name(page_number: usize, extension: &str) -> String {
    format!("{:03}.{}", page_number, extension)
}

/// Sum of the file sizes of all pages.
pub fn calculate_total_size(pages: &[PageRecord]) -> u64 {
    pages.iter().map(|p| p.file_size).sum()
}

/// Where a conversion writes its files.
///
/// ```text
/// <root>/
/// ├── files/page/      final page images (001.webp …)
/// ├── .temp/           full-resolution rasterizer output (removed after the run)
/// └── .temp-validate/  page-count probe output (removed after the probe)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.root.join(PAGES_SUBDIR)
    }

    pub fn render_dir(&self) -> PathBuf {
        self.root.join(".temp")
    }

    pub fn probe_dir(&self) -> PathBuf {
        self.root.join(".temp-validate")
    }
}

/// Statistics for a single conversion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Page count reported by the probe.
    pub total_pages: usize,
    pub converted_pages: usize,
    pub missing_pages: usize,
    pub total_size_bytes: u64,
    pub probe_duration_ms: u64,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a finished conversion produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Output root directory.
    pub output_dir: PathBuf,
    /// Converted pages in ascending page order.
    pub pages: Vec<PageRecord>,
    /// Pages the rasterizer did not produce.
    pub missing_pages: Vec<PageError>,
    pub stats: ConversionStats,
}

//! Error types for the pdf-flipbook library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FlipbookError`] — **Fatal**: the conversion cannot proceed at all
//!   (missing input, rasterizer crashed, a page image could not be
//!   compressed). Returned as `Err(FlipbookError)` from the top-level
//!   `convert*` functions and from the render pipeline.
//!
//! * [`PageError`] — **Non-fatal**: the rasterizer exited cleanly but did not
//!   leave an image for one page. The page is skipped, a warning is logged,
//!   and the error is stored in [`crate::output::ConversionOutput`] so
//!   callers can report the gap.
//!
//! A missing intermediate file and a failing compressor deliberately take
//! different paths: the first is a known rasterizer edge case, the second
//! points at corruption or a systemic problem.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-flipbook library.
#[derive(Debug, Error)]
pub enum FlipbookError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Rasterizer errors ─────────────────────────────────────────────────
    /// The rasterizer binary could not be started at all.
    #[error(
        "Failed to execute '{program}': {source}\n\
Make sure poppler-utils (pdftoppm) is installed, or pass --pdftoppm <PATH>."
    )]
    RasterizerUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The rasterizer ran but exited unsuccessfully.
    #[error("{program} failed with {status}: {stderr}")]
    RenderFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The rasterizer did not exit within the configured timeout.
    #[error("{program} did not finish within {timeout_ms}ms")]
    RenderTimeout { program: String, timeout_ms: u64 },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// A rendered page could not be compressed into the output format.
    #[error("Failed to convert page {page} ('{path}'): {detail}")]
    ConversionFailed {
        page: usize,
        path: PathBuf,
        detail: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create, clean or write inside the output directory.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// The page is left out of the page list; the run still succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The rasterizer exited cleanly but produced no file for this page.
    #[error("Page {page}/{total}: rendered file not found: {expected:?}")]
    MissingRaster {
        page: usize,
        total: usize,
        expected: PathBuf,
    },
}

impl PageError {
    /// 1-indexed page number the error refers to.
    pub fn page(&self) -> usize {
        match self {
            PageError::MissingRaster { page, .. } => *page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failed_display_carries_stderr() {
        let e = FlipbookError::RenderFailed {
            program: "pdftoppm".into(),
            status: "exit status: 1".into(),
            stderr: "Syntax Error: Couldn't read xref table".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("pdftoppm failed"), "got: {msg}");
        assert!(msg.contains("xref table"), "got: {msg}");
    }

    #[test]
    fn rasterizer_unavailable_mentions_program() {
        let e = FlipbookError::RasterizerUnavailable {
            program: "pdftoppm".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        assert!(e.to_string().contains("Failed to execute 'pdftoppm'"));
    }

    #[test]
    fn conversion_failed_display() {
        let e = FlipbookError::ConversionFailed {
            page: 4,
            path: PathBuf::from("/tmp/.temp/page-04.png"),
            detail: "corrupt PNG".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 4"));
        assert!(msg.contains("corrupt PNG"));
    }

    #[test]
    fn missing_raster_display_and_page() {
        let e = PageError::MissingRaster {
            page: 2,
            total: 3,
            expected: PathBuf::from("page-2.png"),
        };
        assert!(e.to_string().starts_with("Page 2/3"));
        assert_eq!(e.page(), 2);
    }
}

//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events while the pipeline converts each page.
//!
//! # Example
//!
//! ```rust
//! use pdf_flipbook::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
//!
//! struct BytesWritten {
//!     total: AtomicU64,
//! }
//!
//! impl ConversionProgressCallback for BytesWritten {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, file_size: u64) {
//!         self.total.fetch_add(file_size, Ordering::SeqCst);
//!         eprintln!("Page {}/{} written ({} bytes)", page_num, total_pages, file_size);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(BytesWritten { total: AtomicU64::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the render pipeline as it processes each page.
///
/// Implementations must be `Send + Sync`; with `concurrency > 1` page
/// events may arrive from any runtime worker thread. All methods have default
/// no-op implementations so callers only override what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the page count is known, before the full render starts.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when the rasterizer has finished the full-resolution render.
    fn on_render_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page image was written.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — probed page count
    /// * `file_size`   — bytes written for this page
    fn on_page_complete(&self, page_num: usize, total_pages: usize, file_size: u64) {
        let _ = (page_num, total_pages, file_size);
    }

    /// Called when the rasterizer left no file for a page.
    fn on_page_missing(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called once after all pages have been attempted.
    ///
    /// Not called when the run aborts with a fatal error.
    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        completes: AtomicUsize,
        missing: AtomicUsize,
        bytes: AtomicU64,
        success_total: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_page_complete(&self, _page_num: usize, _total_pages: usize, file_size: u64) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.bytes.fetch_add(file_size, Ordering::SeqCst);
        }

        fn on_page_missing(&self, _page_num: usize, _total_pages: usize) {
            self.missing.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, _total_pages: usize, success_count: usize) {
            self.success_total.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(5);
        cb.on_render_complete(5);
        cb.on_page_complete(1, 5, 42);
        cb.on_page_missing(2, 5);
        cb.on_conversion_complete(5, 4);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_page_complete(1, 3, 1000);
        tracker.on_page_missing(2, 3);
        tracker.on_page_complete(3, 3, 1500);
        tracker.on_conversion_complete(3, 2);

        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.missing.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.bytes.load(Ordering::SeqCst), 2500);
        assert_eq!(tracker.success_total.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_conversion_start(10);
        cb.on_page_complete(1, 10, 512);
    }
}

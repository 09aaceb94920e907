//! # pdf-flipbook
//!
//! Render a PDF into the page images of an offline HTML flipbook.
//!
//! Each page becomes a compressed WebP under `<output>/files/page/NNN.webp`
//! and the library returns one [`PageRecord`] per page for the viewer
//! template to reference. Rendering is done by an external rasterizer
//! (`pdftoppm` from poppler-utils); no PDF parsing happens in-process.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate path and %PDF magic
//!  ├─ 2. Probe    72 DPI trial render into .temp-validate/, count files
//!  ├─ 3. Render   one pdftoppm run at full DPI into .temp/
//!  ├─ 4. Padding  read back the page-number width pdftoppm chose
//!  ├─ 5. Convert  page-NN.png → files/page/NNN.webp (missing pages: warn + skip)
//!  └─ 6. Output   ordered PageRecords + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_flipbook::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().dpi(150).quality(85).build()?;
//!     let output = convert("book.pdf", "book_flipbook", &config).await?;
//!     for page in &output.pages {
//!         println!("{} ({} bytes)", page.relative_path(), page.file_size);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2flipbook` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_sync, convert_with, count_pages};
pub use error::{FlipbookError, PageError};
pub use output::{
    calculate_total_size, ConversionOutput, ConversionStats, OutputLayout, PageRecord,
};
pub use pipeline::compress::{CompressError, ImageCompressor, WebpCompressor};
pub use pipeline::padding::RasterNaming;
pub use pipeline::probe::PageCountProber;
pub use pipeline::rasterize::{PdftoppmRasterizer, Rasterizer};
pub use pipeline::render::{PageRenderPipeline, RenderJob, RenderedPages};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};

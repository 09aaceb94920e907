//! Pipeline stages for PDF-to-flipbook conversion.
//!
//! Each submodule implements exactly one step. The two external
//! capabilities (rasterizer, compressor) sit behind traits so the stages can
//! be exercised with fakes.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ probe ──▶ render ──▶ [rasterize ─▶ padding ─▶ compress] ──▶ PageRecord list
//! (path)    (count)              (pdftoppm)   (width)     (webp)
//! ```
//!
//! 1. [`input`]     — validate the user-supplied path
//! 2. [`probe`]     — count pages via a low-resolution trial render
//! 3. [`render`]    — full-resolution render and per-page conversion
//! 4. [`rasterize`] — the `Rasterizer` seam and its `pdftoppm` implementation
//! 5. [`padding`]   — infer the rasterizer's file-name padding
//! 6. [`compress`]  — the `ImageCompressor` seam and the WebP encoder
//! 7. [`scratch`]   — self-deleting scratch directories

pub mod compress;
pub mod input;
pub mod padding;
pub mod probe;
pub mod rasterize;
pub mod render;
pub mod scratch;

//! Configuration types for PDF-to-flipbook conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The builder clamps obviously wrong
//! values in its setters and `build()` rejects anything that still cannot
//! work.

use crate::error::FlipbookError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Configuration for a PDF-to-flipbook conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_flipbook::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(150)
///     .quality(85)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI for the full-resolution pass. Range: 36–600. Default: 150.
    ///
    /// 150 DPI keeps body text legible on a desktop screen while a typical
    /// page stays around 100–300 KB as WebP.
    pub dpi: u32,

    /// Compression quality for the page images, 0–100. Default: 85.
    pub quality: u8,

    /// DPI for the page-count probe. Default: 72.
    ///
    /// The probe only counts emitted files, so the lowest resolution the
    /// rasterizer accepts keeps it fast.
    pub probe_dpi: u32,

    /// Number of pages compressed at the same time. Default: 1.
    ///
    /// Results are always returned in page order, whatever the value.
    pub concurrency: usize,

    /// Explicit path to the `pdftoppm` binary.
    /// If None, uses `PDFTOPPM_BIN` or searches `PATH`.
    pub pdftoppm_path: Option<PathBuf>,

    /// Abort the full render if the rasterizer runs longer than this. Default: None.
    pub render_timeout_secs: Option<u64>,

    /// Remove an existing output directory before converting. Default: true.
    pub clean_output: bool,

    /// Receives per-page events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            quality: 85,
            probe_dpi: 72,
            concurrency: 1,
            pdftoppm_path: None,
            render_timeout_secs: None,
            clean_output: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("quality", &self.quality)
            .field("probe_dpi", &self.probe_dpi)
            .field("concurrency", &self.concurrency)
            .field("pdftoppm_path", &self.pdftoppm_path)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("clean_output", &self.clean_output)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(36, 600);
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.config.quality = quality.min(100);
        self
    }

    pub fn probe_dpi(mut self, dpi: u32) -> Self {
        self.config.probe_dpi = dpi.clamp(10, 600);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn pdftoppm_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdftoppm_path = Some(path.into());
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = Some(secs);
        self
    }

    pub fn clean_output(mut self, v: bool) -> Self {
        self.config.clean_output = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, FlipbookError> {
        let c = &self.config;
        if c.dpi < 36 || c.dpi > 600 {
            return Err(FlipbookError::InvalidConfig(format!(
                "DPI must be 36–600, got {}",
                c.dpi
            )));
        }
        if c.quality > 100 {
            return Err(FlipbookError::InvalidConfig(format!(
                "Quality must be 0–100, got {}",
                c.quality
            )));
        }
        if c.concurrency == 0 {
            return Err(FlipbookError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.render_timeout_secs == Some(0) {
            return Err(FlipbookError::InvalidConfig(
                "Render timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

//! The rasterizer seam: turn every page of a PDF into a raster file.
//!
//! The pipeline never talks to a binary directly; it receives an
//! `Arc<dyn Rasterizer>`. Production code uses [`PdftoppmRasterizer`],
//! tests substitute fakes that write files into the output directory.
//!
//! ## Output naming
//!
//! A rasterizer invoked with prefix `<dir>/page` writes
//! `<dir>/page-<N>.<ext>`, where `<N>` is zero-padded to a width the tool
//! picks from the total page count. `pdftoppm` pads to the number of digits
//! of the last page (`page-1.png` for a 9-page file, `page-01.png` for 10–99
//! pages, `page-001.png` from 100 pages on). See [`super::padding`].

use crate::config::ConversionConfig;
use crate::error::FlipbookError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Environment variable overriding the `pdftoppm` location.
pub const PDFTOPPM_BIN_ENV: &str = "PDFTOPPM_BIN";

/// Renders all pages of a PDF with a single invocation.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Render every page of `pdf_path` at `dpi`, writing
    /// `<output_prefix>-<padded page>.<ext>` files.
    ///
    /// Resolves once the work has finished. A tool that cannot be started
    /// yields [`FlipbookError::RasterizerUnavailable`], an unsuccessful exit
    /// yields [`FlipbookError::RenderFailed`].
    async fn rasterize(
        &self,
        pdf_path: &Path,
        dpi: u32,
        output_prefix: &Path,
    ) -> Result<(), FlipbookError>;

    /// Extension of the emitted files, without the dot.
    fn extension(&self) -> &str {
        "png"
    }

    /// Short human-readable name used in logs.
    fn name(&self) -> &str;
}

/// Rasterizer backed by poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl PdftoppmRasterizer {
    /// Use the given binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Locate `pdftoppm`: `PDFTOPPM_BIN`, then `PATH`, then the bare name.
    ///
    /// Falling back to the bare name keeps discovery infallible; a missing
    /// binary surfaces as [`FlipbookError::RasterizerUnavailable`] on first use.
    pub fn discover() -> Self {
        if let Some(bin) = std::env::var_os(PDFTOPPM_BIN_ENV).filter(|v| !v.is_empty()) {
            return Self::new(bin);
        }
        match which::which("pdftoppm") {
            Ok(path) => Self::new(path),
            Err(e) => {
                debug!("pdftoppm not found in PATH: {}", e);
                Self::new("pdftoppm")
            }
        }
    }

    /// Build from the binary path and timeout in `config`.
    pub fn from_config(config: &ConversionConfig) -> Self {
        let rasterizer = match config.pdftoppm_path {
            Some(ref path) => Self::new(path),
            None => Self::discover(),
        };
        match config.render_timeout_secs {
            Some(secs) => rasterizer.with_timeout(Duration::from_secs(secs)),
            None => rasterizer,
        }
    }

    /// Kill the process and fail if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments: `-png -r <dpi> <pdf> <prefix>`.
    pub fn args(dpi: u32, pdf_path: &Path, output_prefix: &Path) -> Vec<OsString> {
        vec![
            "-png".into(),
            "-r".into(),
            dpi.to_string().into(),
            pdf_path.as_os_str().to_owned(),
            output_prefix.as_os_str().to_owned(),
        ]
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::discover()
    }
}

#[async_trait]
impl Rasterizer for PdftoppmRasterizer {
    async fn rasterize(
        &self,
        pdf_path: &Path,
        dpi: u32,
        output_prefix: &Path,
    ) -> Result<(), FlipbookError> {
        let program = self.program.display().to_string();
        debug!(
            "Running {} -png -r {} {} {}",
            program,
            dpi,
            pdf_path.display(),
            output_prefix.display()
        );

        let mut command = Command::new(&self.program);
        command
            .args(Self::args(dpi, pdf_path, output_prefix))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| FlipbookError::RenderTimeout {
                    program: program.clone(),
                    timeout_ms: limit.as_millis() as u64,
                })?,
            None => command.output().await,
        }
        .map_err(|e| FlipbookError::RasterizerUnavailable {
            program: program.clone(),
            source: e,
        })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };

        Err(FlipbookError::RenderFailed {
            program,
            status: output.status.to_string(),
            stderr: detail,
        })
    }

    fn name(&self) -> &str {
        "pdftoppm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_follow_pdftoppm_order() {
        let args = PdftoppmRasterizer::args(150, Path::new("/in/book.pdf"), Path::new("/out/.temp/page"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["-png", "-r", "150", "/in/book.pdf", "/out/.temp/page"]);
    }

    #[test]
    fn from_config_prefers_explicit_path() {
        let config = ConversionConfig::builder()
            .pdftoppm_path("/opt/poppler/bin/pdftoppm")
            .render_timeout_secs(30)
            .build()
            .unwrap();
        let r = PdftoppmRasterizer::from_config(&config);
        assert_eq!(r.program(), Path::new("/opt/poppler/bin/pdftoppm"));
        assert_eq!(r.timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn missing_binary_is_unavailable() {
        let r = PdftoppmRasterizer::new("/nonexistent/bin/pdftoppm");
        let tmp = tempfile::tempdir().unwrap();
        let err = r
            .rasterize(Path::new("doc.pdf"), 72, &tmp.path().join("page"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, FlipbookError::RasterizerUnavailable { .. }),
            "got: {err:?}"
        );
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-pdftoppm");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_carries_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let script = write_script(tmp.path(), "echo 'Syntax Error: bad xref' >&2\nexit 3");
        let err = PdftoppmRasterizer::new(script)
            .rasterize(Path::new("doc.pdf"), 150, &tmp.path().join("page"))
            .await
            .unwrap_err();
        match err {
            FlipbookError::RenderFailed { stderr, status, .. } => {
                assert!(stderr.contains("bad xref"), "stderr: {stderr}");
                assert!(status.contains('3'), "status: {status}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_succeeds_and_receives_arguments() {
        let tmp = tempfile::tempdir().unwrap();
        // Writes one file named after the prefix argument ($5).
        let script = write_script(tmp.path(), "touch \"$5-1.png\"");
        let prefix = tmp.path().join("page");
        PdftoppmRasterizer::new(script)
            .rasterize(Path::new("doc.pdf"), 150, &prefix)
            .await
            .unwrap();
        assert!(tmp.path().join("page-1.png").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_process_times_out() {
        let tmp = tempfile::tempdir().unwrap();
        let script = write_script(tmp.path(), "sleep 5");
        let err = PdftoppmRasterizer::new(script)
            .with_timeout(Duration::from_millis(200))
            .rasterize(Path::new("doc.pdf"), 150, &tmp.path().join("page"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, FlipbookError::RenderTimeout { timeout_ms: 200, .. }),
            "got: {err:?}"
        );
    }
}

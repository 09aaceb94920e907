//! Naming convention of the rasterizer's intermediate files.
//!
//! The rasterizer decides how wide the page number in `page-<N>.png` is,
//! based on the total page count, and the width is not configurable. We read
//! it back from the directory listing once per run and apply it to every
//! page lookup. When nothing usable is listed we fall back to the
//! page-count threshold: more than 99 pages → 3 digits, otherwise 2.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_RASTER_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)-(\d+)\.([A-Za-z0-9]+)$").unwrap());

/// How the page width was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingSource {
    /// Read from an emitted file name.
    Detected,
    /// Derived from the page count because no usable file was listed.
    Fallback,
}

/// The derived naming convention of one rasterizer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterNaming {
    pub prefix: String,
    pub extension: String,
    /// Number of digits the page number is zero-padded to.
    pub width: usize,
    pub source: PaddingSource,
}

impl RasterNaming {
    /// Infer the convention from the file names the rasterizer left behind.
    ///
    /// Only a name whose page number lies in `1..=page_count` is trusted, so
    /// stray files cannot skew the width.
    pub fn detect<I, S>(names: I, prefix: &str, extension: &str, page_count: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let detected = names.into_iter().find_map(|name| {
            let digits = raster_page_digits(name.as_ref(), prefix, extension)?;
            let page: usize = digits.parse().ok()?;
            (page >= 1 && page <= page_count.max(1)).then_some(digits.len())
        });

        let (width, source) = match detected {
            Some(width) => (width, PaddingSource::Detected),
            None => (fallback_width(page_count), PaddingSource::Fallback),
        };

        Self {
            prefix: prefix.to_string(),
            extension: extension.to_string(),
            width,
            source,
        }
    }

    /// Expected intermediate file name for a 1-indexed page.
    pub fn file_name(&self, page: usize) -> String {
        format!(
            "{}-{:0width$}.{}",
            self.prefix,
            page,
            self.extension,
            width = self.width
        )
    }
}

/// Width used when the listing does not reveal one.
pub fn fallback_width(page_count: usize) -> usize {
    if page_count > 99 {
        3
    } else {
        2
    }
}

/// The digit run of `<prefix>-<digits>.<extension>`, if `name` has that shape.
pub fn raster_page_digits<'a>(name: &'a str, prefix: &str, extension: &str) -> Option<&'a str> {
    let caps = RE_RASTER_FILE.captures(name)?;
    if caps.get(1)?.as_str() != prefix || caps.get(3)?.as_str() != extension {
        return None;
    }
    caps.get(2).map(|m| m.as_str())
}

/// Count the names that look like rasterizer output for `prefix`.
pub fn count_raster_files<I, S>(names: I, prefix: &str, extension: &str) -> usize
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter(|n| raster_page_digits(n.as_ref(), prefix, extension).is_some())
        .count()
}

//! Input validation: make sure the PDF path is usable before any rendering.
//!
//! The prober never fails, so this is the only place where a bad input is
//! reported as an error. We check existence, read permission and the PDF
//! magic bytes (`%PDF`) so the user gets a precise message instead of a
//! page count of 1 and an empty flipbook.

use crate::error::FlipbookError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local PDF path and return it in absolute form.
pub fn validate_input(path: impl AsRef<Path>) -> Result<PathBuf, FlipbookError> {
    let path = path.as_ref().to_path_buf();

    if !path.is_file() {
        return Err(FlipbookError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(f) => {
            // Files shorter than the magic are rejected too; missing bytes stay 0.
            let mut head = Vec::with_capacity(4);
            if let Err(e) = f.take(4).read_to_end(&mut head) {
                debug!("Could not read {}: {}", path.display(), e);
            }
            if head != b"%PDF" {
                let mut magic = [0u8; 4];
                magic[..head.len()].copy_from_slice(&head);
                return Err(FlipbookError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(FlipbookError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(FlipbookError::FileNotFound { path });
        }
    }

    let path = absolutize(&path);
    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Join relative paths onto the current directory; absolute paths pass through.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let err = validate_input("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, FlipbookError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = validate_input(tmp.path()).unwrap_err();
        assert!(matches!(err, FlipbookError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fake.pdf");
        std::fs::write(&path, b"PK\x03\x04zip").unwrap();
        match validate_input(&path).unwrap_err() {
            FlipbookError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn file_shorter_than_magic_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        for (name, bytes) in [("empty.pdf", &b""[..]), ("short.pdf", &b"%PD"[..])] {
            let path = tmp.path().join(name);
            std::fs::write(&path, bytes).unwrap();
            match validate_input(&path).unwrap_err() {
                FlipbookError::NotAPdf { magic, .. } => {
                    assert_eq!(&magic[..bytes.len()], bytes);
                    assert!(magic[bytes.len()..].iter().all(|&b| b == 0));
                }
                other => panic!("unexpected for {name}: {other:?}"),
            }
        }
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ok.pdf");
        std::fs::write(&path, b"%PDF-1.4\n%%EOF\n").unwrap();
        let resolved = validate_input(&path).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, path);
    }

    #[test]
    fn absolutize_joins_cwd() {
        let p = absolutize(Path::new("book.pdf"));
        assert!(p.is_absolute());
        assert!(p.ends_with("book.pdf"));
    }
}

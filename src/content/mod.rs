//! Content extraction module
//!
//! Turns uploaded PDF bytes into an ordered sequence of normalized
//! [`PageText`] values, one per non-empty page.

mod pdf;
mod text;

pub use pdf::PdfExtractor;
pub use text::normalize_text;

#[cfg(test)]
pub(crate) use pdf::fixture;

use crate::types::PageText;
use std::path::Path;

/// Leading bytes of every PDF file
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Errors raised while reading a document
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The bytes could not be parsed as a PDF
    #[error("Failed to parse PDF: {0}")]
    Load(String),

    /// The PDF is encrypted and the empty password does not open it
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF parsed but has no pages
    #[error("PDF has no pages")]
    NoPages,

    /// The input is not a PDF document
    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),

    /// Reading the input failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Extract normalized page texts from PDF bytes
pub fn extract_from_bytes(bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError> {
    PdfExtractor::extract(bytes)
}

/// Extract normalized page texts from a PDF file on disk
pub fn extract_from_path(path: &Path) -> Result<Vec<PageText>, ExtractionError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.display().to_string(),
        source,
    })?;
    validate_pdf(path, &bytes)?;
    PdfExtractor::extract(&bytes)
}

/// Check that an upload looks like a PDF by extension and magic bytes
pub fn validate_pdf(path: &Path, bytes: &[u8]) -> Result<(), ExtractionError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => {}
        Some(other) => {
            return Err(ExtractionError::UnsupportedType(format!(
                "file type .{} not allowed, only PDF files are supported",
                other
            )))
        }
        None => {
            return Err(ExtractionError::UnsupportedType(
                "file has no extension, only PDF files are supported".to_string(),
            ))
        }
    }

    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ExtractionError::UnsupportedType(
            "file content is not a PDF".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_pdf_accepts_pdf() {
        let path = PathBuf::from("paper.PDF");
        assert!(validate_pdf(&path, b"%PDF-1.7\n...").is_ok());
    }

    #[test]
    fn test_validate_pdf_rejects_other_extension() {
        let path = PathBuf::from("notes.txt");
        let err = validate_pdf(&path, b"%PDF-1.7").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedType(_)));
        assert!(err.to_string().contains(".txt"));
    }

    #[test]
    fn test_validate_pdf_rejects_missing_magic() {
        let path = PathBuf::from("fake.pdf");
        let err = validate_pdf(&path, b"<html></html>").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedType(_)));
    }

    #[test]
    fn test_extract_from_missing_path() {
        let err = extract_from_path(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, ExtractionError::Io { .. }));
    }
}

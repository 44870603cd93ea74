//! Multi-format text extraction.
//!
//! One strategy per input format, dispatched on the lowercase filename
//! extension. Extraction is best-effort everywhere except dispatch
//! itself: an unrecognized extension fails immediately, while corrupt
//! files, missing OCR, and per-page errors degrade to less (possibly
//! empty) text. The top-level [`extract_text`] pipes whatever the
//! format extractor produced through fuzzy line deduplication to
//! shrink downstream token usage.

pub mod docx;
pub mod image;
pub mod ocr;
pub mod pdf;

use std::path::Path;

use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::text::deduplicate_lines;

pub use ocr::OcrEngine;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Image,
    Text,
}

impl DocumentFormat {
    /// Map a filename to a format by its lowercase extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())?
            .to_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Text),
            "png" | "jpg" | "jpeg" | "tiff" | "bmp" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Extract text from raw file bytes, dispatched by filename extension.
///
/// Returns [`ExtractError::UnsupportedFormat`] for unknown extensions
/// before touching the bytes; everything else is best-effort and may
/// legitimately return an empty string. Output lines are fuzzily
/// deduplicated.
pub fn extract_text(
    bytes: &[u8],
    filename: &str,
    ocr: Option<&OcrEngine>,
    similarity_threshold: f64,
) -> ExtractResult<String> {
    let format = DocumentFormat::from_filename(filename).ok_or_else(|| {
        ExtractError::UnsupportedFormat {
            extension: Path::new(filename)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase(),
        }
    })?;
    debug!(filename, ?format, "dispatching extractor");

    let raw = match format {
        DocumentFormat::Pdf => pdf::extract_pdf(bytes, ocr),
        DocumentFormat::Docx => docx::extract_docx(bytes),
        DocumentFormat::Image => image::extract_image(bytes, ocr),
        // Undecodable byte sequences are discarded, not replaced.
        DocumentFormat::Text => String::from_utf8_lossy(bytes).replace('\u{FFFD}', ""),
    };

    let lines: Vec<&str> = raw.lines().collect();
    Ok(deduplicate_lines(&lines, similarity_threshold).join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::DEFAULT_SIMILARITY_THRESHOLD;

    #[test]
    fn dispatch_recognizes_all_supported_extensions() {
        assert_eq!(
            DocumentFormat::from_filename("cv.pdf"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_filename("CV.DOCX"),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            DocumentFormat::from_filename("notes.txt"),
            Some(DocumentFormat::Text)
        );
        for name in ["a.png", "a.jpg", "a.jpeg", "a.tiff", "a.bmp"] {
            assert_eq!(
                DocumentFormat::from_filename(name),
                Some(DocumentFormat::Image),
                "{name}"
            );
        }
    }

    #[test]
    fn unsupported_extension_fails_fast() {
        let err = extract_text(b"content", "resume.xyz", None, DEFAULT_SIMILARITY_THRESHOLD)
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::UnsupportedFormat { ref extension } if extension == "xyz"
        ));
    }

    #[test]
    fn missing_extension_fails_fast() {
        assert!(extract_text(b"content", "resume", None, DEFAULT_SIMILARITY_THRESHOLD).is_err());
    }

    #[test]
    fn plain_text_decodes_lossily_and_deduplicates() {
        let mut bytes = b"Rust Engineer\n".to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE]); // invalid UTF-8, discarded
        bytes.extend_from_slice(b"\nRust Engineer\nPython Developer");
        let text =
            extract_text(&bytes, "resume.txt", None, DEFAULT_SIMILARITY_THRESHOLD).unwrap();
        assert_eq!(text.matches("Rust Engineer").count(), 1);
        assert!(text.contains("Python Developer"));
    }
}

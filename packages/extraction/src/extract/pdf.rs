//! PDF text extraction with per-page OCR fallback.

use lopdf::Document;
use tracing::{debug, error, info, warn};

use crate::extract::ocr::OcrEngine;
use crate::text::{deduplicate_lines, DEFAULT_SIMILARITY_THRESHOLD};

/// Pages with less embedded text than this get the OCR fallback.
const MIN_EMBEDDED_CHARS: usize = 30;

/// Extract text from a PDF, page by page.
///
/// Each page's embedded text is used when substantial. Sparse pages —
/// scans, or vector-only layouts — are rasterized and OCRed when an
/// engine is available; when both sources produce text their combined
/// line pool is deduplicated as one set. Pages are concatenated with a
/// readable page marker. Extraction is best-effort: a corrupt document
/// or a failed page never aborts, it just contributes less text.
pub fn extract_pdf(bytes: &[u8], ocr: Option<&OcrEngine>) -> String {
    let doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(err) => {
            error!(error = %err, "PDF parse failed");
            return String::new();
        }
    };

    let pages = doc.get_pages();
    info!(pages = pages.len(), "processing PDF");

    let mut text = String::new();
    for (&page_no, _) in pages.iter() {
        debug!(page = page_no, "extracting embedded text");
        let embedded = match doc.extract_text(&[page_no]) {
            Ok(content) => content,
            Err(err) => {
                warn!(page = page_no, error = %err, "embedded text extraction failed");
                String::new()
            }
        };

        let mut page_text = embedded;
        if page_text.trim().chars().count() < MIN_EMBEDDED_CHARS {
            if let Some(engine) = ocr {
                info!(
                    page = page_no,
                    chars = page_text.trim().chars().count(),
                    "page has minimal embedded text, applying OCR fallback"
                );
                match ocr_page(engine, bytes, page_no) {
                    Ok(recognized) => {
                        page_text = merge_sources(&page_text, &recognized, page_no);
                    }
                    Err(err) => {
                        warn!(page = page_no, error = %err, "OCR fallback failed");
                    }
                }
            }
        }

        text.push_str(&format!("\n--- Page {page_no} ---\n{page_text}"));
    }

    text
}

fn ocr_page(engine: &OcrEngine, pdf_bytes: &[u8], page: u32) -> crate::error::OcrResult<String> {
    let png = engine.rasterize_pdf_page(pdf_bytes, page)?;
    engine.recognize(&png)
}

/// Combine embedded and OCR text for one page.
///
/// Both non-empty: the union of their lines goes through fuzzy
/// deduplication as a single pool. OCR only: use it as-is. Neither:
/// keep whatever the embedded pass gave us.
fn merge_sources(embedded: &str, recognized: &str, page_no: u32) -> String {
    if !embedded.trim().is_empty() && !recognized.trim().is_empty() {
        let combined: Vec<&str> = embedded.lines().chain(recognized.lines()).collect();
        let deduplicated = deduplicate_lines(&combined, DEFAULT_SIMILARITY_THRESHOLD);
        info!(
            page = page_no,
            combined = combined.len(),
            unique = deduplicated.len(),
            "merged embedded and OCR lines"
        );
        deduplicated.join("\n")
    } else if !recognized.trim().is_empty() {
        debug!(page = page_no, "using OCR text only");
        recognized.to_string()
    } else {
        embedded.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_yield_empty_text() {
        assert_eq!(extract_pdf(b"not a pdf at all", None), "");
    }

    #[test]
    fn merge_prefers_union_when_both_present() {
        let merged = merge_sources(
            "John Doe\nSoftware Engineer",
            "John Doe\njohn@example.com",
            1,
        );
        assert!(merged.contains("John Doe"));
        assert!(merged.contains("Software Engineer"));
        assert!(merged.contains("john@example.com"));
        // The duplicated name line collapses to one occurrence.
        assert_eq!(merged.matches("John Doe").count(), 1);
    }

    #[test]
    fn merge_uses_ocr_alone_when_embedded_is_blank() {
        let merged = merge_sources("   ", "Recognized text", 1);
        assert_eq!(merged, "Recognized text");
    }

    #[test]
    fn merge_keeps_embedded_when_ocr_is_blank() {
        let merged = merge_sources("Embedded text", "  \n ", 1);
        assert_eq!(merged, "Embedded text");
    }
}

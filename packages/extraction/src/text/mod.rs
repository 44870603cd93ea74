//! Line-level text cleanup.
//!
//! Pure, stateless helpers shared by the format extractors: fuzzy
//! line deduplication, OCR artifact repair, and contact-field
//! validation. Nothing in here touches I/O.

pub mod clean;
pub mod similarity;

pub use clean::{deduplicate_lines, fix_ocr_artifacts, validate_email, validate_phone};
pub use similarity::ratio;

/// Default similarity threshold above which two lines count as duplicates.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

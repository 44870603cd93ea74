//! Resume Ingestion & Extraction Library
//!
//! Turns resume documents (PDF, DOCX, images, plain text) into clean,
//! typed records. Text comes out of format-specific extractors with an
//! OCR fallback; an external language-understanding service does the
//! semantic field extraction behind a multi-key, rate-limited
//! credential pool; and a tolerant normalizer shapes whatever the
//! service answers into a [`ResumeRecord`].
//!
//! # Design Philosophy
//!
//! - Best-effort extraction: a corrupt page or a failed OCR pass
//!   degrades to less text, it never aborts the document
//! - Per-document outcomes: every failure lands in that document's
//!   [`ProcessingResult`]; one bad file never aborts a batch
//! - Defensive parsing: missing, extra, or wrong-typed response keys
//!   degrade to absent fields, never to a crash
//! - The credential pool is the only shared mutable state, and its
//!   quota check + usage recording are a single critical section
//!
//! # Usage
//!
//! ```rust,ignore
//! use resume_extraction::ResumeParser;
//!
//! let parser = ResumeParser::from_env();
//! let result = parser.process_resume(&bytes, "candidate.pdf").await;
//! if result.success {
//!     println!("{:?}", result.record);
//! }
//! ```
//!
//! # Modules
//!
//! - [`extract`] - Format extractors with OCR fallback
//! - [`text`] - Fuzzy deduplication, artifact repair, validation
//! - [`keypool`] - Multi-key rate limiting and rotation
//! - [`model`] - The completion-model seam and the Gemini client
//! - [`pipeline`] - Orchestration, prompts, response normalization
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod extract;
pub mod hashing;
pub mod keypool;
pub mod model;
pub mod pipeline;
pub mod security;
pub mod testing;
pub mod text;
pub mod types;

// Re-export core types at crate root
pub use error::{ExtractError, OcrError, ServiceError};
pub use extract::{extract_text, DocumentFormat, OcrEngine};
pub use hashing::content_hash;
pub use keypool::{estimate_tokens, Clock, KeyPool, RateLimits, SystemClock};
pub use model::{CompletionModel, GeminiModel};
pub use pipeline::{
    normalize::{is_diploma_entry, normalize_experience, parse_response},
    prompts::parsing_prompt,
    ResumeParser,
};
pub use security::{ApiKey, SecretString};
pub use text::{
    deduplicate_lines, fix_ocr_artifacts, validate_email, validate_phone,
    DEFAULT_SIMILARITY_THRESHOLD,
};
pub use types::{ParserConfig, ProcessingResult, ResumeRecord, WorkExperience};

//! Configuration for the extraction pipeline.

use std::time::Duration;

/// Tunables for [`ResumeParser`](crate::pipeline::ResumeParser).
///
/// Defaults match production behavior; tests lower the wait bound.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Similarity at or above which two lines count as duplicates.
    pub similarity_threshold: f64,

    /// Minimum trimmed character count for extracted text to be worth
    /// sending to the service.
    pub min_text_chars: usize,

    /// Longest time to wait for a credential before giving up on the
    /// document.
    pub key_wait: Duration,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: crate::text::DEFAULT_SIMILARITY_THRESHOLD,
            min_text_chars: 10,
            key_wait: Duration::from_secs(65),
        }
    }
}

impl ParserConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dedup similarity threshold.
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Set the minimum meaningful text length.
    pub fn with_min_text_chars(mut self, chars: usize) -> Self {
        self.min_text_chars = chars;
        self
    }

    /// Set the credential wait bound.
    pub fn with_key_wait(mut self, wait: Duration) -> Self {
        self.key_wait = wait;
        self
    }
}

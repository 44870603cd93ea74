//! The resume processing pipeline.
//!
//! Ties the layers together: format extraction and cleanup, prompt
//! assembly, credential acquisition, the service call, and response
//! normalization. Every per-document failure is captured into that
//! document's [`ProcessingResult`]; one bad file never aborts a batch.

pub mod normalize;
pub mod prompts;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::{ExtractResult, ServiceError, ServiceResult};
use crate::extract::{self, OcrEngine};
use crate::keypool::{estimate_tokens, KeyPool};
use crate::model::{CompletionModel, GeminiModel};
use crate::types::{ParserConfig, ProcessingResult, ResumeRecord};

/// Resume parser over a completion model and a credential pool.
///
/// Cheap to share behind an `Arc`; [`process_resume`](Self::process_resume)
/// may run concurrently for many documents — the key pool is the only
/// shared mutable state and handles its own locking.
pub struct ResumeParser<M: CompletionModel> {
    model: M,
    pool: KeyPool,
    ocr: Option<OcrEngine>,
    config: ParserConfig,
}

impl ResumeParser<GeminiModel> {
    /// Production construction: Gemini client, keys from the
    /// environment, OCR probed once.
    pub fn from_env() -> Self {
        Self::new(GeminiModel::new(), KeyPool::from_env()).with_ocr(OcrEngine::probe())
    }
}

impl<M: CompletionModel> ResumeParser<M> {
    /// Build a parser. OCR starts disabled; thread a probed engine in
    /// with [`with_ocr`](Self::with_ocr).
    pub fn new(model: M, pool: KeyPool) -> Self {
        if pool.is_empty() {
            warn!("no API keys configured; parser will extract text only");
        }
        Self {
            model,
            pool,
            ocr: None,
            config: ParserConfig::default(),
        }
    }

    /// Attach (or detach) an OCR engine.
    pub fn with_ocr(mut self, ocr: Option<OcrEngine>) -> Self {
        self.ocr = ocr;
        self
    }

    /// Override pipeline tunables.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// The credential pool (for observability).
    pub fn pool(&self) -> &KeyPool {
        &self.pool
    }

    /// The underlying completion model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Extract deduplicated text from one document.
    ///
    /// Fails only for unsupported formats; everything else is
    /// best-effort and may return an empty string.
    pub fn extract_text(&self, bytes: &[u8], filename: &str) -> ExtractResult<String> {
        extract::extract_text(
            bytes,
            filename,
            self.ocr.as_ref(),
            self.config.similarity_threshold,
        )
    }

    /// Process a single resume end to end.
    ///
    /// Never panics and never propagates an error: the outcome, good
    /// or bad, lands in the returned [`ProcessingResult`].
    pub async fn process_resume(&self, bytes: &[u8], filename: &str) -> ProcessingResult {
        let text = match self.extract_text(bytes, filename) {
            Ok(text) => text,
            Err(err) => return ProcessingResult::failure(filename, err.to_string()),
        };

        if text.trim().chars().count() < self.config.min_text_chars {
            return ProcessingResult::failure(filename, "no meaningful text extracted");
        }

        if self.pool.is_empty() {
            info!(filename, "no keys configured, returning extracted text only");
            return ProcessingResult::text_only(filename);
        }

        match self.parse_with_model(&text).await {
            Ok(Some(record)) => {
                info!(filename, "resume parsed");
                ProcessingResult::success(filename, record)
            }
            Ok(None) => ProcessingResult::failure(filename, "failed to parse resume"),
            Err(err) => {
                warn!(filename, error = %err, "service call failed");
                ProcessingResult::failure(filename, err.to_string())
            }
        }
    }

    /// Process a batch concurrently. Results match inputs by filename;
    /// ordering carries no meaning.
    pub async fn process_batch(
        &self,
        documents: impl IntoIterator<Item = (String, Vec<u8>)>,
    ) -> Vec<ProcessingResult> {
        let futures = documents
            .into_iter()
            .map(|(filename, bytes)| async move { self.process_resume(&bytes, &filename).await });
        join_all(futures).await
    }

    async fn parse_with_model(&self, text: &str) -> ServiceResult<Option<ResumeRecord>> {
        let prompt = prompts::parsing_prompt(text);
        let estimated = estimate_tokens(&prompt);
        debug!(estimated_tokens = estimated, "requesting credential");

        let key = self
            .pool
            .acquire(estimated, self.config.key_wait)
            .await
            .ok_or(ServiceError::NoKeyAvailable)?;

        let response = self.model.complete(&prompt, &key).await?;
        Ok(normalize::parse_response(&response))
    }
}

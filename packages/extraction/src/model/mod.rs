//! Model trait for the external extraction service.
//!
//! The pipeline only needs one capability from the service: turn a
//! prompt into completion text. Implementations wrap a specific
//! provider; [`crate::testing::MockModel`] scripts responses for tests.

pub mod gemini;

use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::security::ApiKey;

pub use gemini::GeminiModel;

/// A text-completion service.
///
/// The credential is passed per call because the pool rotates keys
/// between requests; implementations must not cache it.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Submit a prompt and return the raw completion text.
    async fn complete(&self, prompt: &str, key: &ApiKey) -> ServiceResult<String>;

    /// Provider name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

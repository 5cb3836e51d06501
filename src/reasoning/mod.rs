//! Multimodal reasoning client
//!
//! Stateless single-turn calls: each invocation carries the fully assembled
//! query text and, when present, one inline image. There is no retained
//! conversation history across calls.

pub mod gemini;

use crate::error::StageError;
use crate::types::EncodedImage;
use async_trait::async_trait;

pub use gemini::GeminiClient;

/// Reasoning seam. A local image-decode failure is reported *as the reply
/// text* so the pipeline's output contract stays a plain string; service
/// and network failures are real errors that escalate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Reason: Send + Sync {
    async fn ask(&self, prompt: &str, image: Option<EncodedImage>)
        -> Result<String, StageError>;
}

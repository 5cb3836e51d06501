//! Speech-to-text adapter
//!
//! Only invoked when a capture is present; the orchestrator skips the stage
//! entirely for image-only or empty requests. A transcription failure is not
//! fatal: the orchestrator degrades to an empty transcript with a failed
//! language tag, which downstream stages treat as "do not translate, do not
//! re-target the voice".

pub mod assemblyai;

use crate::error::StageError;
use crate::types::Transcript;
use async_trait::async_trait;
use std::path::Path;

pub use assemblyai::AssemblyAiTranscriber;

/// Transcription seam. One real implementation talks to the hosted service;
/// tests substitute mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe an audio file, auto-detecting the spoken language.
    async fn transcribe(&self, audio: &Path) -> Result<Transcript, StageError>;
}

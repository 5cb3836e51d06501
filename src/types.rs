//! Shared pipeline types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Language detection outcome for a transcript.
///
/// The external result surface renders this back to the plain codes callers
/// expect (`as_code`), but gating decisions inside the pipeline branch on
/// the variant, never on string equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageTag {
    /// The transcription service reported a language code (e.g. "es").
    Detected(String),
    /// No audio was supplied, or the service reported nothing usable.
    Unknown,
    /// Transcription ran and failed.
    Failed,
}

impl LanguageTag {
    /// Wrap a service-reported code, normalizing empty strings to `Unknown`.
    pub fn detected(code: impl Into<String>) -> Self {
        let code = code.into();
        if code.trim().is_empty() {
            LanguageTag::Unknown
        } else {
            LanguageTag::Detected(code.trim().to_lowercase())
        }
    }

    /// Code shown in the externally observed result.
    pub fn as_code(&self) -> &str {
        match self {
            LanguageTag::Detected(code) => code,
            LanguageTag::Unknown => "en",
            LanguageTag::Failed => "error",
        }
    }

    /// Target language for speech synthesis. A failed detection must not
    /// re-target the voice, so it collapses to the default language.
    pub fn synthesis_target(&self) -> &str {
        match self {
            LanguageTag::Detected(code) => code,
            LanguageTag::Unknown | LanguageTag::Failed => "en",
        }
    }

    /// Target language for prompt translation, if any. A failed detection
    /// skips translation entirely rather than targeting the sentinel.
    pub fn translation_target(&self) -> Option<&str> {
        match self {
            LanguageTag::Detected(code) => Some(code),
            LanguageTag::Unknown => Some("en"),
            LanguageTag::Failed => None,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, LanguageTag::Detected(_))
    }
}

/// Speech recognition output: text plus the detected language.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub text: String,
    pub language: LanguageTag,
}

impl Transcript {
    /// Placeholder used when no audio was supplied.
    pub fn absent() -> Self {
        Self {
            text: String::new(),
            language: LanguageTag::Unknown,
        }
    }

    /// Placeholder used when transcription ran and failed.
    pub fn failed() -> Self {
        Self {
            text: String::new(),
            language: LanguageTag::Failed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Base64-encoded image ready for inline transport to the reasoning service.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub base64: String,
    pub mime_type: String,
}

/// Which instruction template the pipeline selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    WithImage,
    VoiceOnly,
}

/// The externally observed five-field result. Always fully populated: on a
/// fatal error the text fields carry the same diagnostic and the audio
/// fields are empty, so callers never branch on a separate error flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub transcript_text: String,
    pub language_code: String,
    pub reply_text: String,
    pub patient_audio: Option<PathBuf>,
    pub reply_audio: Option<PathBuf>,
}

impl PipelineResult {
    /// Uniform degraded result produced at the orchestrator boundary.
    pub fn fatal(diagnostic: impl std::fmt::Display) -> Self {
        let diagnostic = format!("Pipeline error: {diagnostic}");
        Self {
            transcript_text: diagnostic.clone(),
            language_code: diagnostic.clone(),
            reply_text: diagnostic,
            patient_audio: None,
            reply_audio: None,
        }
    }
}

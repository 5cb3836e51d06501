//! Stage error taxonomy
//!
//! Each external call site produces a `StageError`; whether it escalates or
//! gets absorbed is the caller's policy:
//! - translation errors are always absorbed (log and keep the original text),
//! - TTS errors trigger the fallback chain and escalate only once the chain
//!   is exhausted,
//! - transcoding and reasoning-service errors escalate directly to the
//!   pipeline boundary,
//! - missing input is not an error and never reaches this type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    /// Credentials for a provider were absent at call time.
    #[error("{provider} credentials missing")]
    AuthMissing { provider: &'static str },

    /// A provider call failed (network, non-success status, bad payload).
    #[error("{provider} call failed: {detail}")]
    CallFailed {
        provider: &'static str,
        detail: String,
    },

    /// Local payload decoding failed (e.g. image bytes).
    #[error("decode failed: {0}")]
    Decode(String),

    /// The external transcoder exited non-zero or could not be spawned.
    #[error("transcode failed: {0}")]
    Transcode(String),
}

impl StageError {
    pub fn call(provider: &'static str, detail: impl std::fmt::Display) -> Self {
        StageError::CallFailed {
            provider,
            detail: detail.to_string(),
        }
    }

    /// Whether the TTS chain should try its next route after this error.
    /// Every primary-side failure falls through; only a secondary-side
    /// failure is terminal, and that is decided by chain position, not here.
    pub fn is_fallback_worthy(&self) -> bool {
        matches!(
            self,
            StageError::AuthMissing { .. } | StageError::CallFailed { .. }
        )
    }
}

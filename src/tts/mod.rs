//! Text-to-speech with a provider fallback chain
//!
//! ```text
//! text + language ──→ plan_routes ──→ [Primary {voice, model}] ──fail──┐
//!                          │                                           ▼
//!                          └────────────────────────────────────→ [Secondary]
//! ```
//!
//! The chain is an ordered route plan tried in sequence with a uniform
//! result type, not nested error handlers. Planning is pure so the decision
//! table is testable without touching the network:
//! - the reserved language goes straight to the secondary provider
//!   (known primary-provider quality issue for that language, not policy),
//! - missing primary credentials skip the primary,
//! - otherwise primary first (resolved voice, model variant by language),
//!   secondary on any primary failure.
//!
//! The secondary provider is terminal: if it fails, the stage fails and the
//! error escalates to the pipeline boundary.

pub mod elevenlabs;
pub mod gtts;

use crate::audio::transcode::scratch_path;
use crate::config::TtsConfig;
use crate::error::StageError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub use elevenlabs::{ElevenLabsClient, VoiceInfo};
pub use gtts::GoogleTtsClient;

/// Synthesis seam used by the orchestrator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Synthesize: Send + Sync {
    /// Convert `text` to a playable audio file for `language`.
    async fn synthesize(&self, text: &str, language: &str) -> Result<PathBuf, StageError>;
}

/// Primary provider seam: per-voice, per-model synthesis returning raw audio.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrimaryVoice: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        model_id: &str,
    ) -> Result<Vec<u8>, StageError>;
}

/// Secondary provider seam: language-keyed synthesis, no auth, no fallback.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecondaryVoice: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, StageError>;
}

/// One step of the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TtsRoute {
    Primary { voice_id: String, model_id: String },
    Secondary,
}

/// Build the ordered route plan for a language under the given config.
pub fn plan_routes(language: &str, config: &TtsConfig) -> Vec<TtsRoute> {
    if language == config.reserved_secondary_language {
        info!(
            "Language {language} is reserved for the secondary provider, skipping primary"
        );
        return vec![TtsRoute::Secondary];
    }

    if config.api_key.is_none() {
        warn!("Primary TTS credentials missing, using secondary provider only");
        return vec![TtsRoute::Secondary];
    }

    vec![
        TtsRoute::Primary {
            voice_id: config.resolve_voice(language),
            model_id: config.model_for(language).to_string(),
        },
        TtsRoute::Secondary,
    ]
}

/// Chain executor: tries each planned route, writes the winning audio bytes
/// to a fresh file, and reports the terminal error if every route failed.
pub struct TtsEngine {
    primary: Arc<dyn PrimaryVoice>,
    secondary: Arc<dyn SecondaryVoice>,
    config: TtsConfig,
}

impl TtsEngine {
    pub fn new(
        primary: Arc<dyn PrimaryVoice>,
        secondary: Arc<dyn SecondaryVoice>,
        config: TtsConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            config,
        }
    }

    /// Wire up the real provider pair from config.
    pub fn from_config(config: &TtsConfig) -> Self {
        Self::new(
            Arc::new(ElevenLabsClient::new(config.clone())),
            Arc::new(GoogleTtsClient::new(config.clone())),
            config.clone(),
        )
    }

    async fn try_route(
        &self,
        route: &TtsRoute,
        text: &str,
        language: &str,
    ) -> Result<Vec<u8>, StageError> {
        match route {
            TtsRoute::Primary { voice_id, model_id } => {
                self.primary.synthesize(text, voice_id, model_id).await
            }
            TtsRoute::Secondary => self.secondary.synthesize(text, language).await,
        }
    }
}

#[async_trait]
impl Synthesize for TtsEngine {
    async fn synthesize(&self, text: &str, language: &str) -> Result<PathBuf, StageError> {
        let routes = plan_routes(language, &self.config);
        let mut last_error = None;

        for (i, route) in routes.iter().enumerate() {
            match self.try_route(route, text, language).await {
                Ok(bytes) => {
                    if i > 0 {
                        info!("TTS fallback succeeded on route {:?}", route);
                    }
                    let out = scratch_path("mp3");
                    tokio::fs::write(&out, &bytes)
                        .await
                        .map_err(|e| StageError::call("tts", e))?;
                    info!("Synthesized {} bytes to {}", bytes.len(), out.display());
                    return Ok(out);
                }
                Err(e) if i < routes.len() - 1 && e.is_fallback_worthy() => {
                    warn!("TTS route {:?} failed ({e}), trying next", route);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| StageError::call("tts", "no synthesis route available")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_VOICE_ID;

    fn config_with_key() -> TtsConfig {
        TtsConfig {
            api_key: Some("key".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_reserved_language_never_routes_primary() {
        let routes = plan_routes("kn", &config_with_key());
        assert_eq!(routes, vec![TtsRoute::Secondary]);
    }

    #[test]
    fn test_missing_credentials_route_secondary_only() {
        let routes = plan_routes("es", &TtsConfig::default());
        assert_eq!(routes, vec![TtsRoute::Secondary]);
    }

    #[test]
    fn test_default_language_uses_fast_model() {
        let routes = plan_routes("en", &config_with_key());
        match &routes[0] {
            TtsRoute::Primary { voice_id, model_id } => {
                assert_eq!(model_id, "eleven_turbo_v2");
                assert_eq!(voice_id, DEFAULT_VOICE_ID);
            }
            other => panic!("expected primary first, got {other:?}"),
        }
        assert_eq!(routes[1], TtsRoute::Secondary);
    }

    #[test]
    fn test_other_language_uses_multilingual_model() {
        let mut config = config_with_key();
        config
            .voice_overrides
            .insert("es".into(), "spanish-voice".into());

        let routes = plan_routes("es", &config);
        match &routes[0] {
            TtsRoute::Primary { voice_id, model_id } => {
                assert_eq!(model_id, "eleven_multilingual_v2");
                assert_eq!(voice_id, "spanish-voice");
            }
            other => panic!("expected primary first, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_to_secondary() {
        let mut primary = MockPrimaryVoice::new();
        primary
            .expect_synthesize()
            .times(1)
            .returning(|_, _, _| Err(StageError::call("elevenlabs", "status 500")));

        let mut secondary = MockSecondaryVoice::new();
        secondary
            .expect_synthesize()
            .times(1)
            .returning(|_, _| Ok(b"mp3-bytes".to_vec()));

        let engine = TtsEngine::new(Arc::new(primary), Arc::new(secondary), config_with_key());
        let path = engine.synthesize("hello", "es").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"mp3-bytes");
        let _ = tokio::fs::remove_file(path).await;
    }

    #[tokio::test]
    async fn test_reserved_language_skips_primary_even_with_key() {
        let mut primary = MockPrimaryVoice::new();
        primary.expect_synthesize().times(0);

        let mut secondary = MockSecondaryVoice::new();
        secondary
            .expect_synthesize()
            .times(1)
            .returning(|_, _| Ok(b"kn".to_vec()));

        let engine = TtsEngine::new(Arc::new(primary), Arc::new(secondary), config_with_key());
        engine.synthesize("text", "kn").await.unwrap();
    }

    #[tokio::test]
    async fn test_secondary_failure_is_terminal() {
        let mut primary = MockPrimaryVoice::new();
        primary
            .expect_synthesize()
            .returning(|_, _, _| Err(StageError::call("elevenlabs", "down")));

        let mut secondary = MockSecondaryVoice::new();
        secondary
            .expect_synthesize()
            .returning(|_, _| Err(StageError::call("gtts", "down too")));

        let engine = TtsEngine::new(Arc::new(primary), Arc::new(secondary), config_with_key());
        let err = engine.synthesize("text", "es").await.unwrap_err();
        assert!(err.to_string().contains("down too"));
    }
}

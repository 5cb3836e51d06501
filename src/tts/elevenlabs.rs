//! Primary TTS provider adapter (ElevenLabs-style REST API)

use crate::config::TtsConfig;
use crate::error::StageError;
use crate::tts::PrimaryVoice;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const PROVIDER: &str = "elevenlabs";

/// Output format requested from the provider (mp3, 44.1 kHz, 128 kbps).
const OUTPUT_FORMAT: &str = "mp3_44100_128";

pub struct ElevenLabsClient {
    client: Client,
    config: TtsConfig,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// One entry of the provider's voice catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceInfo {
    pub voice_id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    voices: Vec<VoiceInfo>,
}

impl ElevenLabsClient {
    pub fn new(config: TtsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn api_key(&self) -> Result<&str, StageError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(StageError::AuthMissing { provider: PROVIDER })
    }

    /// Fetch the provider's voice catalog (name, identity, category).
    pub async fn list_voices(&self) -> Result<Vec<VoiceInfo>, StageError> {
        let response = self
            .client
            .get(format!("{}/v1/voices", self.config.base_url))
            .header("xi-api-key", self.api_key()?)
            .send()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::call(PROVIDER, format!("voices {status}: {body}")));
        }

        let voices: VoicesResponse = response
            .json()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))?;
        Ok(voices.voices)
    }
}

#[async_trait]
impl PrimaryVoice for ElevenLabsClient {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        model_id: &str,
    ) -> Result<Vec<u8>, StageError> {
        let request = SpeechRequest {
            text,
            model_id,
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        };

        debug!("Primary TTS: voice={voice_id}, model={model_id}");

        let response = self
            .client
            .post(format!(
                "{}/v1/text-to-speech/{voice_id}",
                self.config.base_url
            ))
            .query(&[("output_format", OUTPUT_FORMAT)])
            .header("xi-api-key", self.api_key()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))?;

        // A non-success status is the fallback trigger, not a panic.
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::call(PROVIDER, format!("status {status}: {body}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))?;

        info!("Primary TTS produced {} bytes (voice={voice_id}, model={model_id})", bytes.len());
        Ok(bytes.to_vec())
    }
}

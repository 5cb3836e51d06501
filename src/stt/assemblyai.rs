//! AssemblyAI-style transcription adapter
//!
//! Three-step REST flow: upload the raw audio bytes, create a transcript
//! job with language detection enabled, then poll the job until it settles.
//! Polling is bounded by the configured timeout so a stuck job cannot block
//! an invocation indefinitely.

use crate::config::SttConfig;
use crate::error::StageError;
use crate::stt::SpeechToText;
use crate::types::{LanguageTag, Transcript};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const PROVIDER: &str = "assemblyai";

pub struct AssemblyAiTranscriber {
    client: Client,
    config: SttConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptJob {
    id: String,
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    language_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl AssemblyAiTranscriber {
    pub fn new(config: SttConfig) -> Self {
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

    async fn upload(&self, audio: &Path) -> Result<String, StageError> {
        let api_key = self.api_key()?;
        let bytes = tokio::fs::read(audio)
            .await
            .map_err(|e| StageError::call(PROVIDER, format!("reading {}: {e}", audio.display())))?;

        let response = self
            .client
            .post(format!("{}/v2/upload", self.config.base_url))
            .header("authorization", api_key)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::call(PROVIDER, format!("upload {status}: {body}")));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))?;
        Ok(upload.upload_url)
    }

    async fn create_job(&self, audio_url: &str) -> Result<TranscriptJob, StageError> {
        let response = self
            .client
            .post(format!("{}/v2/transcript", self.config.base_url))
            .header("authorization", self.api_key()?)
            .json(&serde_json::json!({
                "audio_url": audio_url,
                "language_detection": true,
            }))
            .send()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::call(PROVIDER, format!("create {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))
    }

    async fn poll_job(&self, id: &str) -> Result<TranscriptJob, StageError> {
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(self.config.timeout_secs);

        loop {
            let response = self
                .client
                .get(format!("{}/v2/transcript/{id}", self.config.base_url))
                .header("authorization", self.api_key()?)
                .send()
                .await
                .map_err(|e| StageError::call(PROVIDER, e))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(StageError::call(PROVIDER, format!("poll {status}: {body}")));
            }

            let job: TranscriptJob = response
                .json()
                .await
                .map_err(|e| StageError::call(PROVIDER, e))?;

            match job.status.as_str() {
                "completed" => return Ok(job),
                "error" => {
                    let detail = job.error.unwrap_or_else(|| "transcription error".into());
                    return Err(StageError::call(PROVIDER, detail));
                }
                other => debug!("Transcript {id} still {other}"),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(StageError::call(PROVIDER, "transcription timed out"));
            }
            tokio::time::sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
        }
    }
}

#[async_trait]
impl SpeechToText for AssemblyAiTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<Transcript, StageError> {
        let upload_url = self.upload(audio).await?;
        let job = self.create_job(&upload_url).await?;
        let job = self.poll_job(&job.id).await?;

        let text = job.text.unwrap_or_default();
        let language = job
            .language_code
            .map(LanguageTag::detected)
            .unwrap_or(LanguageTag::Unknown);

        info!(
            "Transcribed {} chars, detected language {}",
            text.len(),
            language.as_code()
        );

        Ok(Transcript { text, language })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credentials_fail_before_network() {
        let transcriber = AssemblyAiTranscriber::new(SttConfig::default());
        let err = transcriber
            .transcribe(Path::new("/nonexistent.wav"))
            .await
            .unwrap_err();
        // Credential check precedes any file or network access.
        assert!(matches!(err, StageError::AuthMissing { .. }));
    }

    #[test]
    fn test_job_deserialization() {
        let job: TranscriptJob = serde_json::from_str(
            r#"{"id":"abc","status":"completed","text":"hola","language_code":"es"}"#,
        )
        .unwrap();
        assert_eq!(job.status, "completed");
        assert_eq!(job.text.as_deref(), Some("hola"));
        assert_eq!(job.language_code.as_deref(), Some("es"));
    }
}

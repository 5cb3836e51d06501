//! Secondary TTS provider adapter (Google-Translate-TTS-style endpoint)
//!
//! Unauthenticated, language-keyed, and terminal: there is nothing to fall
//! back to past this point, so an error here fails the synthesis stage.

use crate::config::TtsConfig;
use crate::error::StageError;
use crate::tts::SecondaryVoice;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;
use url::Url;

const PROVIDER: &str = "gtts";

pub struct GoogleTtsClient {
    client: Client,
    config: TtsConfig,
}

impl GoogleTtsClient {
    pub fn new(config: TtsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn endpoint(&self, text: &str, language: &str) -> Result<Url, StageError> {
        let mut url = Url::parse(&self.config.secondary_base_url)
            .and_then(|u| u.join("/translate_tts"))
            .map_err(|e| StageError::call(PROVIDER, e))?;
        url.query_pairs_mut()
            .append_pair("ie", "UTF-8")
            .append_pair("client", "tw-ob")
            .append_pair("tl", language)
            .append_pair("q", text);
        Ok(url)
    }
}

#[async_trait]
impl SecondaryVoice for GoogleTtsClient {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, StageError> {
        let url = self.endpoint(text, language)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(StageError::call(PROVIDER, format!("status {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))?;

        if bytes.is_empty() {
            return Err(StageError::call(PROVIDER, "empty audio payload"));
        }

        info!("Secondary TTS produced {} bytes (lang={language})", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_carries_language_and_text() {
        let client = GoogleTtsClient::new(TtsConfig::default());
        let url = client.endpoint("hello world", "kn").unwrap();
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("tl".to_string(), "kn".to_string())));
        assert!(query.contains(&("q".to_string(), "hello world".to_string())));
        assert!(url.path().ends_with("/translate_tts"));
    }
}

//! Gemini-style generateContent adapter

use crate::config::ReasoningConfig;
use crate::error::StageError;
use crate::reasoning::Reason;
use crate::types::EncodedImage;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const PROVIDER: &str = "gemini";

pub struct GeminiClient {
    client: Client,
    config: ReasoningConfig,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationSettings,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationSettings {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

impl GeminiClient {
    pub fn new(config: ReasoningConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn build_request(&self, prompt: &str, image: Option<&EncodedImage>) -> GenerateRequest {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];

        if let Some(image) = image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.base64.clone(),
                },
            });
        }

        let generation = &self.config.generation;
        GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationSettings {
                temperature: generation.temperature,
                top_p: generation.top_p,
                top_k: generation.top_k,
                max_output_tokens: generation.max_output_tokens,
                response_mime_type: generation.response_mime_type.clone(),
            },
        }
    }
}

#[async_trait]
impl Reason for GeminiClient {
    async fn ask(
        &self,
        prompt: &str,
        image: Option<EncodedImage>,
    ) -> Result<String, StageError> {
        // Validate the inline payload locally; a broken image becomes the
        // reply text instead of an error so the output slot stays a string.
        if let Some(image) = &image {
            if let Err(e) = base64::engine::general_purpose::STANDARD.decode(&image.base64) {
                return Ok(format!("Error decoding image for the reasoning service: {e}"));
            }
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(StageError::AuthMissing { provider: PROVIDER })?;

        debug!(
            "Reasoning call: model={}, image={}",
            self.config.model,
            image.is_some()
        );
        let request = self.build_request(prompt, image.as_ref());

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.config.base_url, self.config.model
            ))
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::call(PROVIDER, format!("status {status}: {body}")));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))?;

        let reply = extract_reply(&raw)
            .ok_or_else(|| StageError::call(PROVIDER, "no candidates in response"))?;

        info!("Reasoning reply: {} chars", reply.len());
        Ok(reply)
    }
}

/// Navigate `candidates[0].content.parts[*].text` and join the text parts.
fn extract_reply(raw: &Value) -> Option<String> {
    let parts = raw
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let texts: Vec<&str> = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(ReasoningConfig::default())
    }

    #[test]
    fn test_request_parts_order() {
        let image = EncodedImage {
            base64: "aGVsbG8=".into(),
            mime_type: "image/png".into(),
        };
        let request = client().build_request("describe", Some(&image));
        let value = serde_json::to_value(&request).unwrap();

        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], "describe");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "aGVsbG8=");
    }

    #[test]
    fn test_request_without_image_is_text_only() {
        let request = client().build_request("describe", None);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"].as_array().unwrap().len(), 1);
        assert_eq!(value["generationConfig"]["topK"], 64);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[tokio::test]
    async fn test_undecodable_image_becomes_reply_text() {
        let image = EncodedImage {
            base64: "!!!not-base64!!!".into(),
            mime_type: "image/jpeg".into(),
        };
        let reply = client().ask("describe", Some(image)).await.unwrap();
        assert!(reply.contains("Error decoding image"));
    }

    #[test]
    fn test_extract_reply_joins_parts() {
        let raw: Value = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{"text": "With what I see, "}, {"text": "rest easy."}] }
            }]
        });
        assert_eq!(extract_reply(&raw).unwrap(), "With what I see, rest easy.");
    }

    #[test]
    fn test_extract_reply_rejects_empty() {
        let raw: Value = serde_json::json!({"candidates": []});
        assert!(extract_reply(&raw).is_none());
    }
}

//! Prompt and reply translation
//!
//! Both translation call sites (instruction template before reasoning, model
//! reply afterwards) share one contract and one failure policy: a failed
//! translation is logged and the untranslated text flows on. Translation is
//! never allowed to take the pipeline down.

use crate::config::TranslateConfig;
use crate::error::StageError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;
use url::Url;

const PROVIDER: &str = "translate";

/// Translation seam shared by both call sites.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translate: Send + Sync {
    /// Translate `text` from `source` ("auto" for detection) into `target`.
    /// Translating text already in the target language is a no-op, not an
    /// error.
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, StageError>;
}

/// Absorb-and-continue wrapper used at both call sites: on any failure the
/// original text is returned and the error is logged.
pub async fn translate_or_original(
    translator: &dyn Translate,
    text: &str,
    target: &str,
) -> String {
    match translator.translate(text, "auto", target).await {
        Ok(translated) => translated,
        Err(e) => {
            warn!("Translation to {target} failed, using original text: {e}");
            text.to_string()
        }
    }
}

/// Adapter for the public Google-Translate-style endpoint.
pub struct GoogleTranslator {
    client: Client,
    config: TranslateConfig,
}

impl GoogleTranslator {
    pub fn new(config: TranslateConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn endpoint(&self, text: &str, source: &str, target: &str) -> Result<Url, StageError> {
        let mut url = Url::parse(&self.config.base_url)
            .and_then(|u| u.join("/translate_a/single"))
            .map_err(|e| StageError::call(PROVIDER, e))?;
        url.query_pairs_mut()
            .append_pair("client", "gtx")
            .append_pair("sl", source)
            .append_pair("tl", target)
            .append_pair("dt", "t")
            .append_pair("q", text);
        Ok(url)
    }
}

#[async_trait]
impl Translate for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, StageError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let url = self.endpoint(text, source, target)?;
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

        let value: Value = response
            .json()
            .await
            .map_err(|e| StageError::call(PROVIDER, e))?;

        collect_segments(&value)
            .ok_or_else(|| StageError::call(PROVIDER, "unexpected response shape"))
    }
}

/// The endpoint answers with nested arrays; the first array holds
/// `[translated, original, ...]` segments. Concatenate the translated parts.
fn collect_segments(value: &Value) -> Option<String> {
    let segments = value.get(0)?.as_array()?;
    let mut out = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(Value::as_str) {
            out.push_str(part);
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_segments_concatenates() {
        let value: Value = serde_json::from_str(
            r#"[[["Hello ","Hola ",null],["world","mundo",null]],null,"es"]"#,
        )
        .unwrap();
        assert_eq!(collect_segments(&value).unwrap(), "Hello world");
    }

    #[test]
    fn test_collect_segments_rejects_garbage() {
        let value: Value = serde_json::json!({"not": "an array"});
        assert!(collect_segments(&value).is_none());
    }

    #[tokio::test]
    async fn test_empty_text_short_circuits() {
        let translator = GoogleTranslator::new(TranslateConfig::default());
        let out = translator.translate("  ", "auto", "es").await.unwrap();
        assert_eq!(out, "  ");
    }

    #[tokio::test]
    async fn test_failure_policy_returns_original() {
        let mut mock = MockTranslate::new();
        mock.expect_translate()
            .returning(|_, _, _| Err(StageError::call(PROVIDER, "down")));
        let out = translate_or_original(&mock, "unchanged", "es").await;
        assert_eq!(out, "unchanged");
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let mut mock = MockTranslate::new();
        mock.expect_translate()
            .returning(|_, _, _| Ok("translated".to_string()));
        let out = translate_or_original(&mock, "original", "es").await;
        assert_eq!(out, "translated");
    }
}

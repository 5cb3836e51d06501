//! Configuration management
//!
//! Every adapter receives an explicit config struct at construction instead
//! of reading process environment at call time. `Config::from_env()` takes a
//! snapshot of the environment; callers that want credential rotation to
//! take effect simply rebuild the config on their own lifecycle (the HTTP
//! server does this per request).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hardcoded fallback voice identity for the primary TTS provider (Rachel).
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub stt: SttConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
    #[serde(default)]
    pub reasoning: ReasoningConfig,
    #[serde(default)]
    pub tts: TtsConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Snapshot the process environment into a config.
    pub fn from_env() -> Self {
        Self {
            stt: SttConfig::from_env(),
            translate: TranslateConfig::default(),
            reasoning: ReasoningConfig::from_env(),
            tts: TtsConfig::from_env(),
            audio: AudioConfig::from_env(),
            server: ServerConfig::from_env(),
        }
    }
}

/// Transcription service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    /// Bearer credential; empty means unauthenticated (calls will fail soft).
    #[serde(skip)]
    pub api_key: Option<String>,
    #[serde(default = "default_stt_base_url")]
    pub base_url: String,
    /// Seconds between transcript-status polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Upper bound on the whole upload-and-poll round trip.
    #[serde(default = "default_stt_timeout")]
    pub timeout_secs: u64,
}

fn default_stt_base_url() -> String {
    "https://api.assemblyai.com".to_string()
}

fn default_poll_interval() -> u64 {
    2
}

fn default_stt_timeout() -> u64 {
    120
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_stt_base_url(),
            poll_interval_secs: default_poll_interval(),
            timeout_secs: default_stt_timeout(),
        }
    }
}

impl SttConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: read_env("ASSEMBLYAI_API_KEY"),
            ..Default::default()
        }
    }
}

/// Translation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    #[serde(default = "default_translate_base_url")]
    pub base_url: String,
    #[serde(default = "default_translate_timeout")]
    pub timeout_secs: u64,
}

fn default_translate_base_url() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_translate_timeout() -> u64 {
    20
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            base_url: default_translate_base_url(),
            timeout_secs: default_translate_timeout(),
        }
    }
}

/// Generation parameters sent with every reasoning call. Exposed as
/// configuration so callers can see and tune what the reference defaults are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature (default 1.0).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Nucleus sampling threshold (default 0.95).
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Top-k sampling bound (default 64).
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Maximum output length in tokens (default 8192).
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Response MIME type (default "text/plain").
    #[serde(default = "default_response_mime_type")]
    pub response_mime_type: String,
}

fn default_temperature() -> f32 {
    1.0
}

fn default_top_p() -> f32 {
    0.95
}

fn default_top_k() -> u32 {
    64
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_response_mime_type() -> String {
    "text/plain".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            response_mime_type: default_response_mime_type(),
        }
    }
}

/// Multimodal reasoning service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    #[serde(default = "default_reasoning_base_url")]
    pub base_url: String,
    #[serde(default = "default_reasoning_model")]
    pub model: String,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default = "default_reasoning_timeout")]
    pub timeout_secs: u64,
}

fn default_reasoning_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_reasoning_model() -> String {
    "gemini-flash-latest".to_string()
}

fn default_reasoning_timeout() -> u64 {
    60
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_reasoning_base_url(),
            model: default_reasoning_model(),
            generation: GenerationConfig::default(),
            timeout_secs: default_reasoning_timeout(),
        }
    }
}

impl ReasoningConfig {
    pub fn from_env() -> Self {
        let mut config = Self {
            api_key: read_env("GEMINI_API_KEY"),
            ..Default::default()
        };
        if let Some(model) = read_env("GEMINI_MODEL") {
            config.model = model;
        }
        config
    }
}

/// Text-to-speech settings: primary provider credentials and voice
/// resolution, the reserved-language override, and the secondary endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    #[serde(default = "default_tts_base_url")]
    pub base_url: String,
    /// Global default voice identity, if configured.
    pub default_voice: Option<String>,
    /// Per-language voice identity overrides, keyed by lowercase code.
    #[serde(default)]
    pub voice_overrides: HashMap<String, String>,
    /// Language forced onto the secondary provider regardless of
    /// credentials. The primary provider has a known quality issue here.
    #[serde(default = "default_reserved_language")]
    pub reserved_secondary_language: String,
    /// Language considered "default": selects the faster model variant.
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default = "default_multilingual_model")]
    pub multilingual_model: String,
    #[serde(default = "default_fast_model")]
    pub fast_model: String,
    #[serde(default = "default_stability")]
    pub stability: f32,
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,
    #[serde(default = "default_secondary_base_url")]
    pub secondary_base_url: String,
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,
}

fn default_tts_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_reserved_language() -> String {
    "kn".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_multilingual_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_fast_model() -> String {
    "eleven_turbo_v2".to_string()
}

fn default_stability() -> f32 {
    0.5
}

fn default_similarity_boost() -> f32 {
    0.75
}

fn default_secondary_base_url() -> String {
    "https://translate.google.com".to_string()
}

fn default_tts_timeout() -> u64 {
    60
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_tts_base_url(),
            default_voice: None,
            voice_overrides: HashMap::new(),
            reserved_secondary_language: default_reserved_language(),
            default_language: default_language(),
            multilingual_model: default_multilingual_model(),
            fast_model: default_fast_model(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            secondary_base_url: default_secondary_base_url(),
            timeout_secs: default_tts_timeout(),
        }
    }
}

const VOICE_OVERRIDE_PREFIX: &str = "ELEVENLABS_VOICE_ID_";

impl TtsConfig {
    pub fn from_env() -> Self {
        let mut voice_overrides = HashMap::new();
        for (key, value) in std::env::vars() {
            if let Some(lang) = key.strip_prefix(VOICE_OVERRIDE_PREFIX) {
                if !lang.is_empty() && !value.trim().is_empty() {
                    voice_overrides.insert(lang.to_lowercase(), value);
                }
            }
        }

        Self {
            api_key: read_env("ELEVENLABS_API_KEY"),
            default_voice: read_env("ELEVENLABS_VOICE_ID"),
            voice_overrides,
            ..Default::default()
        }
    }

    /// Voice identity resolution order: per-language override, then the
    /// configured default, then the hardcoded fallback identity.
    pub fn resolve_voice(&self, language: &str) -> String {
        self.voice_overrides
            .get(&language.to_lowercase())
            .or(self.default_voice.as_ref())
            .cloned()
            .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string())
    }

    /// Model variant by language: multilingual for anything non-default,
    /// the faster variant for the default language.
    pub fn model_for(&self, language: &str) -> &str {
        if language == self.default_language {
            &self.fast_model
        } else {
            &self.multilingual_model
        }
    }
}

/// Capture normalization / transcoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Transcoder binary invoked as a subprocess.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    /// Sample rate assumed when the capture carries none.
    #[serde(default = "default_fallback_sample_rate")]
    pub fallback_sample_rate: u32,
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_fallback_sample_rate() -> u32 {
    44_100
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            fallback_sample_rate: default_fallback_sample_rate(),
        }
    }
}

impl AudioConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = read_env("MEDIVOICE_FFMPEG") {
            config.ffmpeg_path = path;
        }
        config
    }
}

/// HTTP deployment surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// When true the process is running under a managed deployment and the
    /// router is embedded rather than bound to a local listener.
    #[serde(default)]
    pub embedded: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7860
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            embedded: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(host) = read_env("MEDIVOICE_HOST") {
            config.host = host;
        }
        if let Some(port) = read_env("MEDIVOICE_PORT").and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        config.embedded = read_env("DEPLOY_ENV").is_some();
        config
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

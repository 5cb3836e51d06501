//! End-to-end pipeline scenarios with faked service adapters

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use medivoice::audio::{CaptureInput, SampleData};
use medivoice::config::AudioConfig;
use medivoice::error::StageError;
use medivoice::pipeline::{ConsultRequest, ImageInput, NoProgress, Pipeline, Progress};
use medivoice::prompts;
use medivoice::reasoning::Reason;
use medivoice::stt::SpeechToText;
use medivoice::translate::Translate;
use medivoice::tts::Synthesize;
use medivoice::types::{EncodedImage, LanguageTag, Transcript};

// ─── Fakes ──────────────────────────────────────────────────────────────

struct FakeStt {
    transcript: Option<Transcript>,
}

#[async_trait]
impl SpeechToText for FakeStt {
    async fn transcribe(&self, _audio: &Path) -> Result<Transcript, StageError> {
        self.transcript
            .clone()
            .ok_or_else(|| StageError::call("assemblyai", "unavailable"))
    }
}

/// Tags translated text so tests can see which strings passed through.
struct TaggingTranslator {
    calls: AtomicUsize,
}

impl TaggingTranslator {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Translate for TaggingTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: &str,
        target: &str,
    ) -> Result<String, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("[{target}] {text}"))
    }
}

struct FakeReason {
    reply: String,
    seen_queries: Mutex<Vec<(String, bool)>>,
}

impl FakeReason {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            seen_queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Reason for FakeReason {
    async fn ask(
        &self,
        prompt: &str,
        image: Option<EncodedImage>,
    ) -> Result<String, StageError> {
        self.seen_queries
            .lock()
            .unwrap()
            .push((prompt.to_string(), image.is_some()));
        Ok(self.reply.clone())
    }
}

struct FakeTts {
    seen: Mutex<Vec<(String, String)>>,
}

impl FakeTts {
    fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Synthesize for FakeTts {
    async fn synthesize(&self, text: &str, language: &str) -> Result<PathBuf, StageError> {
        self.seen
            .lock()
            .unwrap()
            .push((text.to_string(), language.to_string()));
        Ok(PathBuf::from("/tmp/fake-reply.mp3"))
    }
}

fn test_audio_config() -> AudioConfig {
    // `true` stands in for the transcoder.
    AudioConfig {
        ffmpeg_path: "true".to_string(),
        ..Default::default()
    }
}

fn speech_capture() -> CaptureInput {
    CaptureInput::Timed {
        sample_rate: 16_000,
        samples: SampleData::Mono(vec![0.01; 256]),
    }
}

fn jpeg_bytes() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]
}

// ─── Scenarios ──────────────────────────────────────────────────────────

#[tokio::test]
async fn no_input_returns_fixed_reply_and_empty_audio() {
    let tts = Arc::new(FakeTts::new());
    let pipeline = Pipeline::new(
        Arc::new(FakeStt { transcript: None }),
        Arc::new(TaggingTranslator::new()),
        Arc::new(FakeReason::new("should never be used")),
        tts.clone(),
        test_audio_config(),
    );

    let result = pipeline.run(ConsultRequest::default(), &NoProgress).await;

    assert_eq!(result.transcript_text, "No speech provided.");
    assert_eq!(result.language_code, "en");
    assert_eq!(result.reply_text, prompts::NO_INPUT_REPLY);
    assert!(result.patient_audio.is_none());
    assert!(result.reply_audio.is_none());
    assert!(tts.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn image_only_skips_reply_translation() {
    let translator = Arc::new(TaggingTranslator::new());
    let reasoning = Arc::new(FakeReason::new("With what I see, I think you are fine."));
    let tts = Arc::new(FakeTts::new());

    let pipeline = Pipeline::new(
        Arc::new(FakeStt { transcript: None }),
        translator.clone(),
        reasoning.clone(),
        tts.clone(),
        test_audio_config(),
    );

    let request = ConsultRequest {
        capture: None,
        image: Some(ImageInput::Bytes(jpeg_bytes())),
    };
    let result = pipeline.run(request, &NoProgress).await;

    // The reasoning query notes both the image and the absent speech.
    let queries = reasoning.seen_queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    let (query, had_image) = &queries[0];
    assert!(query.contains("No speech was provided."));
    assert!(query.contains("A medical image is attached."));
    assert!(*had_image);

    // Reply text is exactly what the service returned: no reply translation
    // happened, only the single prompt translation ran.
    assert_eq!(result.reply_text, "With what I see, I think you are fine.");
    assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.language_code, "en");
}

#[tokio::test]
async fn spanish_speech_translates_prompt_and_reply_and_targets_voice() {
    let translator = Arc::new(TaggingTranslator::new());
    let reasoning = Arc::new(FakeReason::new("Drink water and rest."));
    let tts = Arc::new(FakeTts::new());

    let pipeline = Pipeline::new(
        Arc::new(FakeStt {
            transcript: Some(Transcript {
                text: "me duele la cabeza".to_string(),
                language: LanguageTag::detected("es"),
            }),
        }),
        translator.clone(),
        reasoning.clone(),
        tts.clone(),
        test_audio_config(),
    );

    let request = ConsultRequest {
        capture: Some(speech_capture()),
        image: None,
    };
    let result = pipeline.run(request, &NoProgress).await;

    assert_eq!(result.transcript_text, "me duele la cabeza");
    assert_eq!(result.language_code, "es");

    // Prompt and reply both went through the translator targeting Spanish.
    assert_eq!(translator.calls.load(Ordering::SeqCst), 2);
    assert_eq!(result.reply_text, "[es] Drink water and rest.");

    // The reasoning query carried the Spanish-context note.
    let queries = reasoning.seen_queries.lock().unwrap();
    assert!(queries[0].0.contains("The patient spoke in es."));
    assert!(queries[0].0.contains("No medical image is available."));

    // The voice was re-targeted to the detected language.
    let synthesized = tts.seen.lock().unwrap();
    assert_eq!(synthesized.len(), 1);
    assert_eq!(synthesized[0].1, "es");

    assert!(result.patient_audio.is_some());
    assert_eq!(result.reply_audio, Some(PathBuf::from("/tmp/fake-reply.mp3")));
}

#[tokio::test]
async fn failed_transcription_keeps_voice_on_default_language() {
    let translator = Arc::new(TaggingTranslator::new());
    let tts = Arc::new(FakeTts::new());

    let pipeline = Pipeline::new(
        Arc::new(FakeStt { transcript: None }),
        translator.clone(),
        Arc::new(FakeReason::new("unused")),
        tts.clone(),
        test_audio_config(),
    );

    let request = ConsultRequest {
        capture: Some(speech_capture()),
        image: Some(ImageInput::Bytes(jpeg_bytes())),
    };
    let result = pipeline.run(request, &NoProgress).await;

    // The sentinel language code surfaces in the result but is never used
    // as a translation or synthesis target.
    assert_eq!(result.language_code, "error");
    assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    let synthesized = tts.seen.lock().unwrap();
    assert_eq!(synthesized[0].1, "en");
}

#[tokio::test]
async fn transcoder_failure_produces_uniform_fatal_tuple() {
    let pipeline = Pipeline::new(
        Arc::new(FakeStt { transcript: None }),
        Arc::new(TaggingTranslator::new()),
        Arc::new(FakeReason::new("unused")),
        Arc::new(FakeTts::new()),
        AudioConfig {
            // `false` exits non-zero: the transcoder "fails".
            ffmpeg_path: "false".to_string(),
            ..Default::default()
        },
    );

    let request = ConsultRequest {
        capture: Some(speech_capture()),
        image: None,
    };
    let result = pipeline.run(request, &NoProgress).await;

    assert!(result.transcript_text.starts_with("Pipeline error:"));
    assert_eq!(result.transcript_text, result.language_code);
    assert_eq!(result.transcript_text, result.reply_text);
    assert!(result.patient_audio.is_none());
    assert!(result.reply_audio.is_none());
}

#[tokio::test]
async fn progress_checkpoints_are_monotonic() {
    struct Recorder(Mutex<Vec<f32>>);
    impl Progress for Recorder {
        fn report(&self, fraction: f32, _stage: &str) {
            self.0.lock().unwrap().push(fraction);
        }
    }

    let recorder = Recorder(Mutex::new(Vec::new()));
    let pipeline = Pipeline::new(
        Arc::new(FakeStt {
            transcript: Some(Transcript {
                text: "my head hurts".to_string(),
                language: LanguageTag::detected("en"),
            }),
        }),
        Arc::new(TaggingTranslator::new()),
        Arc::new(FakeReason::new("Rest.")),
        Arc::new(FakeTts::new()),
        test_audio_config(),
    );

    let request = ConsultRequest {
        capture: Some(speech_capture()),
        image: None,
    };
    pipeline.run(request, &recorder).await;

    let checkpoints = recorder.0.lock().unwrap();
    assert!(!checkpoints.is_empty());
    assert!(checkpoints.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*checkpoints.last().unwrap(), 1.0);
}

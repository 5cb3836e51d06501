//! Pipeline orchestrator
//!
//! ```text
//! capture ─→ normalize ─→ transcode ─→ transcribe ─→ translate prompt
//!                                                         │
//!            synthesize ←─ translate reply ←─ reason ←────┘
//! ```
//!
//! Stages run in fixed order; a missing input is a no-op with a defined
//! default, never an error. The whole sequence sits inside one failure
//! boundary: whatever escalates produces the uniform five-field result with
//! the same diagnostic in every text slot, so callers never see a crash or
//! a partially shaped answer.

pub mod progress;

use crate::audio::{self, transcode, CaptureInput};
use crate::config::{AudioConfig, Config};
use crate::prompts;
use crate::reasoning::{GeminiClient, Reason};
use crate::stt::{AssemblyAiTranscriber, SpeechToText};
use crate::translate::{translate_or_original, GoogleTranslator, Translate};
use crate::tts::{Synthesize, TtsEngine};
use crate::types::{PipelineResult, PromptVariant, Transcript};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

pub use progress::{LogProgress, NoProgress, Progress};

/// Image input as supplied by the caller.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// One consultation request: optional voice capture, optional image.
#[derive(Debug, Clone, Default)]
pub struct ConsultRequest {
    pub capture: Option<CaptureInput>,
    pub image: Option<ImageInput>,
}

/// The orchestrator. Holds one adapter per stage behind its seam; real
/// adapters come from `from_config`, tests inject their own.
pub struct Pipeline {
    stt: Arc<dyn SpeechToText>,
    translator: Arc<dyn Translate>,
    reasoning: Arc<dyn Reason>,
    tts: Arc<dyn Synthesize>,
    audio: AudioConfig,
}

impl Pipeline {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        translator: Arc<dyn Translate>,
        reasoning: Arc<dyn Reason>,
        tts: Arc<dyn Synthesize>,
        audio: AudioConfig,
    ) -> Self {
        Self {
            stt,
            translator,
            reasoning,
            tts,
            audio,
        }
    }

    /// Wire the real service adapters from a config snapshot.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(AssemblyAiTranscriber::new(config.stt.clone())),
            Arc::new(GoogleTranslator::new(config.translate.clone())),
            Arc::new(GeminiClient::new(config.reasoning.clone())),
            Arc::new(TtsEngine::from_config(&config.tts)),
            config.audio.clone(),
        )
    }

    /// Run one consultation. Never fails: errors collapse into the uniform
    /// degraded result at this boundary.
    pub async fn run(&self, request: ConsultRequest, progress: &dyn Progress) -> PipelineResult {
        match self.run_inner(request, progress).await {
            Ok(result) => result,
            Err(e) => {
                error!("Pipeline failed: {e:#}");
                PipelineResult::fatal(e)
            }
        }
    }

    async fn run_inner(
        &self,
        request: ConsultRequest,
        progress: &dyn Progress,
    ) -> Result<PipelineResult> {
        let mut transcript = Transcript::absent();
        let mut patient_audio = None;

        // Voice capture: normalize, persist, transcode for playback,
        // transcribe. Transcoding is fatal; transcription degrades.
        if let Some(capture) = request.capture {
            info!("Patient voice capture received");
            let normalized = audio::normalize(capture, self.audio.fallback_sample_rate);
            let wav_path = transcode::scratch_path("wav");
            audio::write_wav(&normalized, &wav_path)?;

            let mp3_path = transcode::transcode_to_mp3(&self.audio.ffmpeg_path, &wav_path).await?;
            patient_audio = Some(mp3_path);

            progress.report(0.2, "Transcribing speech");
            transcript = match self.stt.transcribe(&wav_path).await {
                Ok(t) => t,
                Err(e) => {
                    warn!("Transcription failed: {e}");
                    Transcript::failed()
                }
            };
        } else {
            info!("No patient voice provided");
        }

        let has_image = request.image.is_some();
        let variant = if has_image {
            PromptVariant::WithImage
        } else {
            PromptVariant::VoiceOnly
        };

        // Instruction template, translated into the patient's language when
        // one was detected. A failed detection keeps the original template.
        progress.report(0.4, "Preparing instructions");
        let base_prompt = prompts::base_prompt(variant);
        let translated_prompt = match transcript.language.translation_target() {
            Some(target) => {
                translate_or_original(self.translator.as_ref(), base_prompt, target).await
            }
            None => base_prompt.to_string(),
        };

        let encoded_image = match &request.image {
            Some(ImageInput::Path(path)) => Some(audio::encode_image(path)?),
            Some(ImageInput::Bytes(bytes)) => Some(audio::encode_image_bytes(bytes)),
            None => None,
        };

        let query = prompts::build_query(&translated_prompt, &transcript, has_image);

        // Reasoning runs only when there is something to reason about.
        progress.report(0.6, "Analyzing");
        let had_input = has_image || !transcript.is_empty();
        let mut reply = if had_input {
            self.reasoning.ask(&query, encoded_image).await?
        } else {
            prompts::NO_INPUT_REPLY.to_string()
        };

        // Match the reply language to the patient only when speech produced
        // a transcript in a genuinely detected language. Image-only requests
        // keep the reply in the service's native response language.
        if !transcript.is_empty() && transcript.language.is_detected() {
            reply = translate_or_original(
                self.translator.as_ref(),
                &reply,
                transcript.language.as_code(),
            )
            .await;
        }

        let mut reply_audio = None;
        if had_input && !reply.is_empty() {
            progress.report(0.8, "Synthesizing reply");
            let path = self
                .tts
                .synthesize(&reply, transcript.language.synthesis_target())
                .await?;
            reply_audio = Some(path);
        }

        progress.report(1.0, "Done");

        Ok(PipelineResult {
            transcript_text: if transcript.is_empty() {
                prompts::NO_SPEECH_PLACEHOLDER.to_string()
            } else {
                transcript.text.clone()
            },
            language_code: transcript.language.as_code().to_string(),
            reply_text: reply,
            patient_audio,
            reply_audio,
        })
    }
}

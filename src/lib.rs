//! Medivoice - Multilingual Medical Voice Consultation Library
//!
//! A request-orchestration pipeline over external speech and reasoning
//! services:
//! - capture normalization and ffmpeg transcoding for playback,
//! - hosted transcription with language auto-detection,
//! - instruction and reply translation into the patient's language,
//! - multimodal (text + image) reasoning,
//! - text-to-speech with a primary/secondary provider fallback chain.
//!
//! # Example
//!
//! ```ignore
//! use medivoice::config::Config;
//! use medivoice::pipeline::{ConsultRequest, NoProgress, Pipeline};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pipeline = Pipeline::from_config(&Config::from_env());
//!     let result = pipeline.run(ConsultRequest::default(), &NoProgress).await;
//!     println!("{}", result.reply_text);
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod reasoning;
pub mod server;
pub mod stt;
pub mod translate;
pub mod tts;
pub mod types;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::StageError;
pub use pipeline::{ConsultRequest, Pipeline};
pub use types::{LanguageTag, PipelineResult, Transcript};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

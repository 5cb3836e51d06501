//! CLI interface for medivoice

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::audio::{self, CaptureInput};
use crate::config::Config;
use crate::pipeline::{ConsultRequest, ImageInput, Pipeline, Progress};
use crate::server;
use crate::tts::ElevenLabsClient;

#[derive(Parser)]
#[command(name = "medivoice")]
#[command(about = "Multilingual medical voice consultation pipeline", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one consultation from local files
    Consult {
        /// WAV recording of the patient's description
        #[arg(short, long)]
        audio: Option<PathBuf>,
        /// Medical image to include
        #[arg(short, long)]
        image: Option<PathBuf>,
        /// Print the result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Start the consultation API server
    Serve {
        /// Bind host
        #[arg(long, env = "MEDIVOICE_HOST")]
        host: Option<String>,
        /// Bind port
        #[arg(long, env = "MEDIVOICE_PORT")]
        port: Option<u16>,
    },
    /// List the primary TTS provider's voice catalog
    Voices,
}

/// Progress sink rendering the advisory checkpoints as a terminal bar.
struct BarProgress {
    bar: indicatif::ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = indicatif::ProgressBar::new(100);
        bar.set_style(
            indicatif::ProgressStyle::with_template("{bar:30} {pos:>3}% {msg}")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Progress for BarProgress {
    fn report(&self, fraction: f32, stage: &str) {
        self.bar.set_position((fraction * 100.0) as u64);
        self.bar.set_message(stage.to_string());
    }
}

/// Parse arguments and dispatch.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Consult { audio, image, json } => consult(audio, image, json).await,
        Commands::Serve { host, port } => {
            let config = Config::from_env();
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            if config.server.embedded {
                // Managed deployments embed the router; the local listener
                // is only for interactive use.
                anyhow::bail!(
                    "DEPLOY_ENV is set: embed medivoice::server::router() in the host application"
                );
            }
            server::serve(&host, port).await
        }
        Commands::Voices => voices().await,
    }
}

async fn consult(audio: Option<PathBuf>, image: Option<PathBuf>, json: bool) -> Result<()> {
    let capture = match audio {
        Some(path) => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Some(load_capture(&bytes)?)
        }
        None => None,
    };

    let request = ConsultRequest {
        capture,
        image: image.map(ImageInput::Path),
    };

    let config = Config::from_env();
    let pipeline = Pipeline::from_config(&config);

    let progress = BarProgress::new();
    let result = pipeline.run(request, &progress).await;
    progress.finish();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Transcript:   {}", result.transcript_text);
        println!("Language:     {}", result.language_code);
        println!("Reply:        {}", result.reply_text);
        if let Some(path) = &result.patient_audio {
            println!("Patient mp3:  {}", path.display());
        }
        if let Some(path) = &result.reply_audio {
            println!("Reply mp3:    {}", path.display());
        }
    }

    Ok(())
}

fn load_capture(bytes: &[u8]) -> Result<CaptureInput> {
    audio::capture_from_wav_bytes(bytes).context("Input audio must be a WAV file")
}

async fn voices() -> Result<()> {
    let config = Config::from_env();
    if config.tts.api_key.is_none() {
        anyhow::bail!("ELEVENLABS_API_KEY is not set");
    }

    let client = ElevenLabsClient::new(config.tts);
    let voices = client.list_voices().await?;

    println!("{:<20} | {:<30} | Category", "Name", "Voice ID");
    println!("{}", "-".repeat(65));
    for voice in voices {
        println!("{:<20} | {:<30} | {}", voice.name, voice.voice_id, voice.category);
    }

    Ok(())
}

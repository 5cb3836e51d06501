//! Medivoice - Multilingual Medical Voice Consultation
//!
//! Transcribes a spoken patient description, reasons over it (and an
//! optional medical image) with a multimodal service, and speaks the reply
//! back in the patient's language.

use medivoice::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (WARN level by default, use RUST_LOG=info for more)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    cli::run().await
}

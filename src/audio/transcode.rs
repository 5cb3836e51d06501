//! External transcoder invocation
//!
//! The UI plays compressed stereo audio, so the lossless capture WAV is
//! handed to ffmpeg for a 44.1 kHz two-channel mp3. A transcoder failure is
//! fatal to the invocation: without a playable file there is nothing useful
//! to return for the audio slot, and the orchestrator boundary reports it.

use crate::error::StageError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Transcode a WAV file to stereo 44.1 kHz mp3 next to a fresh temp path.
pub async fn transcode_to_mp3(ffmpeg_path: &str, src: &Path) -> Result<PathBuf, StageError> {
    let out = scratch_path("mp3");

    debug!("Transcoding {} -> {}", src.display(), out.display());

    let output = tokio::process::Command::new(ffmpeg_path)
        .arg("-y")
        .arg("-i")
        .arg(src)
        .args(["-ar", "44100", "-ac", "2"])
        .arg(&out)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .output()
        .await
        .map_err(|e| StageError::Transcode(format!("failed to spawn {ffmpeg_path}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(StageError::Transcode(format!(
            "{} exited with {}: {}",
            ffmpeg_path,
            output.status,
            stderr.trim()
        )));
    }

    Ok(out)
}

/// Fresh per-invocation scratch path. The caller owns cleanup; files are
/// intentionally left behind so the UI can stream them after the request.
pub fn scratch_path(extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!("medivoice-{}.{extension}", uuid::Uuid::new_v4()))
}

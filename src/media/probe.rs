use std::path::{Path, PathBuf};

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::media::process::CancelToken;
use crate::media::transform::MediaTransform;

/// Audio containers the pipeline accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// RIFF/WAVE, read in-process.
    Wav,
    /// MPEG-1 Layer III.
    Mp3,
    /// MPEG-4 container.
    Mp4,
    /// MPEG-4 audio-only container.
    M4a,
    /// Raw ADTS AAC.
    Aac,
}

impl AudioFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> SlidecastResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| SlidecastError::unsupported(path, "file has no extension"))?;
        match ext.as_str() {
            "wav" => Ok(Self::Wav),
            "mp3" => Ok(Self::Mp3),
            "mp4" => Ok(Self::Mp4),
            "m4a" => Ok(Self::M4a),
            "aac" => Ok(Self::Aac),
            other => Err(SlidecastError::unsupported(
                path,
                format!("'.{other}' is not one of wav, mp3, mp4, m4a, aac"),
            )),
        }
    }

    /// `true` when the duration comes from the header rather than a container probe.
    pub fn is_header_only(self) -> bool {
        matches!(self, Self::Wav)
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
            Self::M4a => "m4a",
            Self::Aac => "aac",
        };
        f.write_str(name)
    }
}

/// A probed media file. Never mutated after probing.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MediaAsset {
    /// Location on disk.
    pub path: PathBuf,
    /// Duration in fractional seconds.
    pub duration_sec: f64,
    /// Detected container.
    pub format: AudioFormat,
}

/// Report the duration and format of `path` without modifying it.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn probe(
    path: &Path,
    transform: &dyn MediaTransform,
    cancel: &CancelToken,
) -> SlidecastResult<MediaAsset> {
    if !path.is_file() {
        return Err(SlidecastError::unsupported(path, "file does not exist"));
    }
    let format = AudioFormat::from_path(path)?;
    let duration_sec = if format.is_header_only() {
        wav_duration(path)?
    } else {
        transform.probe_duration(path, cancel)?
    };
    tracing::debug!(%format, duration_sec, "probed");

    Ok(MediaAsset {
        path: path.to_path_buf(),
        duration_sec,
        format,
    })
}

fn wav_duration(path: &Path) -> SlidecastResult<f64> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| SlidecastError::unsupported(path, format!("invalid WAV header: {e}")))?;
    let rate = reader.spec().sample_rate;
    if rate == 0 {
        return Err(SlidecastError::unsupported(path, "WAV sample rate is zero"));
    }
    Ok(f64::from(reader.duration()) / f64::from(rate))
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;

use std::path::{Path, PathBuf};

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::media::probe::probe;
use crate::media::process::CancelToken;
use crate::media::transform::MediaTransform;

/// Durations closer than this are treated as equal, in seconds.
pub const DURATION_EPSILON_SEC: f64 = 1e-3;

/// What [`conform`] did to the file.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConformOutcome {
    /// Already the right length; the file was not touched.
    Unchanged {
        /// Probed duration.
        duration_sec: f64,
    },
    /// The file was replaced by its leading `to_sec` seconds.
    Trimmed {
        /// Duration before trimming.
        from_sec: f64,
        /// Duration after trimming.
        to_sec: f64,
    },
}

impl ConformOutcome {
    /// Duration of the source before conforming.
    pub fn source_duration_sec(&self) -> f64 {
        match *self {
            Self::Unchanged { duration_sec } => duration_sec,
            Self::Trimmed { from_sec, .. } => from_sec,
        }
    }

    /// `true` when the file was rewritten.
    pub fn was_trimmed(&self) -> bool {
        matches!(self, Self::Trimmed { .. })
    }
}

/// Make the audio at `path` exactly `target_sec` long.
///
/// Longer tracks are cut to `[0, target_sec)` by stream copy and replace the original through a
/// rename, so the original is never missing. Shorter tracks are rejected and left as they are.
#[tracing::instrument(skip_all, fields(path = %path.display(), target_sec = target_sec))]
pub fn conform(
    path: &Path,
    target_sec: f64,
    transform: &dyn MediaTransform,
    cancel: &CancelToken,
) -> SlidecastResult<ConformOutcome> {
    if !target_sec.is_finite() || target_sec <= 0.0 {
        return Err(SlidecastError::validation(format!(
            "target audio duration must be > 0, got {target_sec}"
        )));
    }

    let asset = probe(path, transform, cancel)?;
    let actual = asset.duration_sec;

    if (actual - target_sec).abs() <= DURATION_EPSILON_SEC {
        tracing::debug!(actual, target_sec, "audio already matches");
        return Ok(ConformOutcome::Unchanged {
            duration_sec: actual,
        });
    }
    if actual < target_sec {
        return Err(SlidecastError::AudioTooShort {
            path: path.to_path_buf(),
            actual_sec: actual,
            target_sec,
        });
    }

    let tmp = trimmed_sibling(path);
    let replaced = transform
        .trim_audio(path, &tmp, target_sec, cancel)
        .map_err(|e| match e {
            SlidecastError::Encode { stderr, .. } => SlidecastError::unsupported(
                path,
                format!("cannot trim without re-encoding: {stderr}"),
            ),
            other => other,
        })
        .and_then(|()| {
            std::fs::rename(&tmp, path).map_err(|e| {
                SlidecastError::Other(anyhow::anyhow!(
                    "failed to replace '{}' with trimmed audio: {e}",
                    path.display()
                ))
            })
        });

    if let Err(e) = replaced {
        if tmp.exists()
            && let Err(rm) = std::fs::remove_file(&tmp)
        {
            tracing::warn!(path = %tmp.display(), error = %rm, "failed to remove trim output");
        }
        return Err(e);
    }

    tracing::info!(from_sec = actual, to_sec = target_sec, "audio trimmed");
    Ok(ConformOutcome::Trimmed {
        from_sec: actual,
        to_sec: target_sec,
    })
}

/// `<dir>/<stem>_trimmed.<ext>` next to `path`.
fn trimmed_sibling(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_trimmed.{}", ext.to_string_lossy()),
        None => format!("{stem}_trimmed"),
    };
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/conform.rs"]
mod tests;

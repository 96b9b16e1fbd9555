use std::path::PathBuf;

use crate::pipeline::run::{CleanupFailure, RunSummary};

/// Convenience result type used across slidecast.
pub type SlidecastResult<T> = Result<T, SlidecastError>;

/// Error taxonomy for a pipeline run.
///
/// Every variant names the offending path, count or duration so the message alone is enough for
/// an operator to act on.
#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    /// The working directory does not exist.
    #[error("working directory '{}' does not exist", .0.display())]
    DirectoryMissing(PathBuf),

    /// The working directory contains no usable image files.
    #[error("no image files (.jpg, .jpeg, .png) found in '{}'", .0.display())]
    NoImages(PathBuf),

    /// A media file has an extension or encoding the pipeline cannot handle.
    #[error("unsupported format for '{}': {reason}", .path.display())]
    UnsupportedFormat {
        /// Offending file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// The audio track is shorter than the video it has to cover.
    #[error(
        "audio '{}' is too short: {actual_sec:.3}s available, {target_sec:.3}s required",
        .path.display()
    )]
    AudioTooShort {
        /// Audio file.
        path: PathBuf,
        /// Probed duration in seconds.
        actual_sec: f64,
        /// Required duration in seconds.
        target_sec: f64,
    },

    /// Producing one captioned frame failed; the whole batch is discarded.
    #[error("composition failed for frame {index}: {reason}")]
    CompositionFailed {
        /// Zero-based frame ordinal.
        index: usize,
        /// Underlying failure.
        reason: String,
    },

    /// The frame directory holds no frames to assemble.
    #[error("no frames to assemble in '{}'", .0.display())]
    NoFrames(PathBuf),

    /// An external media tool exited unsuccessfully.
    #[error("{tool} exited with {status}: {stderr}")]
    Encode {
        /// Tool name (`ffmpeg`, `ffprobe`).
        tool: String,
        /// Exit status description.
        status: String,
        /// Tool diagnostics, verbatim.
        stderr: String,
    },

    /// A required external tool could not be started.
    #[error("{0} is required but was not found on PATH")]
    ToolMissing(String),

    /// Invalid configuration or caller-provided values.
    #[error("validation error: {0}")]
    Validation(String),

    /// The run was cancelled by its owner.
    #[error("pipeline run cancelled")]
    Cancelled,

    /// The video was written but intermediate artifacts could not be removed.
    #[error(
        "video written to '{}' but cleanup failed: {}",
        .summary.output_path.display(),
        describe_cleanup(.failures)
    )]
    Cleanup {
        /// Summary of the otherwise successful run.
        summary: Box<RunSummary>,
        /// Paths that could not be removed.
        failures: Vec<CleanupFailure>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification used by callers to tell mistakes apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing directory, missing images, unsupported media.
    Input,
    /// Audio shorter than the video.
    Length,
    /// One frame could not be composited.
    Frame,
    /// Encoder or trim tool failure.
    Encode,
    /// Tooling missing from the host.
    Environment,
    /// Bad configuration values.
    Configuration,
    /// Run cancelled.
    Cancelled,
    /// Post-success cleanup failure.
    Cleanup,
    /// Anything else (IO, decoding).
    Other,
}

impl SlidecastError {
    /// Build a [`SlidecastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SlidecastError::UnsupportedFormat`] value.
    pub fn unsupported(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`SlidecastError::CompositionFailed`] value.
    pub fn composition(index: usize, reason: impl Into<String>) -> Self {
        Self::CompositionFailed {
            index,
            reason: reason.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DirectoryMissing(_) | Self::NoImages(_) | Self::UnsupportedFormat { .. } => {
                ErrorKind::Input
            }
            Self::AudioTooShort { .. } => ErrorKind::Length,
            Self::CompositionFailed { .. } => ErrorKind::Frame,
            Self::NoFrames(_) | Self::Encode { .. } => ErrorKind::Encode,
            Self::ToolMissing(_) => ErrorKind::Environment,
            Self::Validation(_) => ErrorKind::Configuration,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Cleanup { .. } => ErrorKind::Cleanup,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// `true` when the output video exists despite the error.
    pub fn is_post_success(&self) -> bool {
        matches!(self, Self::Cleanup { .. })
    }
}

fn describe_cleanup(failures: &[CleanupFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("'{}' ({})", f.path.display(), f.message))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

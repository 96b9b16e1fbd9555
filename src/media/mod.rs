//! External media capabilities: duration probing, audio trimming, caption burning and encoding.

pub mod ffmpeg;
pub mod probe;
pub mod process;
pub mod transform;

//! Encoding the composited frame sequence with the conformed audio.

pub mod sequence;

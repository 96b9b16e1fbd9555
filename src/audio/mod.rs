//! Length-matching of the background track to the video.

pub mod conform;

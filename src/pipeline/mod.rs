//! Run orchestration: configuration, input discovery, timing and the staged run itself.

pub mod config;
pub mod input;
pub mod run;
pub mod timing;

//! Input acquisition core for a game-controller firmware.
//!
//! Raw pin readings go in, a debounced, SOCD-cleaned [`input::NormalizedInputState`]
//! comes out once per poll.

pub mod config;
pub mod input;
pub mod runtime;

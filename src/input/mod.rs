//! Input acquisition core
//!
//! Turns noisy pin readings into a normalized controller state, once per poll:
//!
//! 1. [`source`] - Raw snapshot from overrides or one batched read per port
//! 2. [`debounce`] - Minimum-dwell filter per logical line
//! 3. [`lock`] - Suppression of select/start/home while locked
//! 4. [`stick`] - SOCD cleaning and pad/stick synthesis
//! 5. [`pipeline`] - Sequencing and ownership of all per-process state
//!
//! # Architecture
//!
//! ```text
//! Ports ──► PortCache ──► Source ──► Debounce ──► LockGate ──► Stick ──► NormalizedInputState
//!           (bounded)    (overrides)  (history)                (SOCD)
//! ```

pub mod debounce;
pub mod lines;
pub mod lock;
pub mod pipeline;
pub mod port;
pub mod port_cache;
pub mod source;
pub mod state;
pub mod stick;
pub mod tick;

pub use lines::{LineDescriptor, LineTable, LogicalLine, Polarity, Pull};
pub use pipeline::{InputCore, PayloadSource, PipelineSettings, Polling, StickInput, Unbound};
pub use state::{NormalizedInputState, RawInputSnapshot, TouchPoint, TouchpadData};
pub use stick::{OutputMode, StickState};

// Errors from startup and poll are fatal; rejected overrides go back to the pusher
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Ran out of cached port slots ({capacity}) registering {port}")]
    PortCacheFull { capacity: usize, port: String },

    #[error("Failed to bind {}: {reason}", bind_target(.line))]
    BindFailed {
        line: Option<LogicalLine>,
        reason: String,
    },

    #[error("Failed to read port {port}: {reason}")]
    PortFault { port: String, reason: String },

    #[error("Input line {0} configured more than once")]
    DuplicateLine(LogicalLine),

    #[error("Override rejected: {0}")]
    OverrideRejected(String),
}

fn bind_target(line: &Option<LogicalLine>) -> &'static str {
    line.map(LogicalLine::name).unwrap_or("input")
}

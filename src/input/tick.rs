use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

// Microsecond ticks unless configured otherwise
pub const DEFAULT_TICKS_PER_MS: u64 = 1_000;

/// Monotonic tick counter; wraps at `u64::MAX`.
pub trait TickSource: Debug + Send + 'static {
    fn now(&self) -> u64;

    fn ticks_per_ms(&self) -> u64;
}

// Ticks derived from std's monotonic clock
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
    ticks_per_ms: u64,
}

impl MonotonicClock {
    pub fn new(ticks_per_ms: u64) -> Self {
        Self {
            origin: Instant::now(),
            ticks_per_ms,
        }
    }
}

impl TickSource for MonotonicClock {
    fn now(&self) -> u64 {
        let nanos = self.origin.elapsed().as_nanos();
        // Truncation to u64 is the counter wraparound
        (nanos * u128::from(self.ticks_per_ms) / 1_000_000) as u64
    }

    fn ticks_per_ms(&self) -> u64 {
        self.ticks_per_ms
    }
}

/// Tick counter advanced by hand; clones share the same counter.
#[derive(Debug, Clone)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
    ticks_per_ms: u64,
}

impl ManualClock {
    pub fn new(start: u64, ticks_per_ms: u64) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(start)),
            ticks_per_ms,
        }
    }

    pub fn set(&self, tick: u64) {
        self.ticks.store(tick, Ordering::Release);
    }

    pub fn advance(&self, ticks: u64) {
        // fetch_add wraps on overflow
        self.ticks.fetch_add(ticks, Ordering::AcqRel);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(ms.wrapping_mul(self.ticks_per_ms));
    }
}

impl TickSource for ManualClock {
    fn now(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    fn ticks_per_ms(&self) -> u64 {
        self.ticks_per_ms
    }
}

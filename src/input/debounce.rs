//! Minimum-dwell hysteresis filter, applied independently to every logical line.
//!
//! A proposed transition is accepted only when at least `min_dwell_ticks` have
//! elapsed since the line's last accepted transition. Rejected transitions leave
//! the history untouched, so bounce shorter than the dwell never reaches the output.

use tracing::debug;

use crate::input::lines::LogicalLine;
use crate::input::state::RawInputSnapshot;
use crate::input::tick::DEFAULT_TICKS_PER_MS;

// Default dwell before a line may change state again
pub const DEFAULT_DEBOUNCE_MS: u64 = 5;

/// Last accepted value of a line and the tick it was accepted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonHistory {
    pub state: bool,
    pub tick: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    min_dwell_ticks: u64,
}

impl Debouncer {
    pub fn new(min_dwell_ticks: u64) -> Self {
        Self { min_dwell_ticks }
    }

    /// Dwell expressed in milliseconds at the given tick rate.
    pub fn from_millis(debounce_ms: u64, ticks_per_ms: u64) -> Self {
        Self::new(debounce_ms.saturating_mul(ticks_per_ms))
    }

    pub fn min_dwell_ticks(&self) -> u64 {
        self.min_dwell_ticks
    }

    /// Filters one raw value against its history and returns the value to use.
    pub fn debounce(&self, raw: bool, history: &mut ButtonHistory, now: u64) -> bool {
        if raw == history.state {
            return raw;
        }

        // Wrapping keeps the elapsed time correct across counter overflow
        let elapsed = now.wrapping_sub(history.tick);
        if elapsed < self.min_dwell_ticks {
            return history.state;
        }

        history.state = raw;
        history.tick = now;
        raw
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::from_millis(DEFAULT_DEBOUNCE_MS, DEFAULT_TICKS_PER_MS)
    }
}

/// Histories for every logical line, owned by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct HistoryTable {
    entries: [ButtonHistory; LogicalLine::COUNT],
}

impl HistoryTable {
    pub fn get(&self, line: LogicalLine) -> ButtonHistory {
        self.entries[line.index()]
    }

    /// Debounces every line of `snapshot` in place.
    pub fn apply(&mut self, debouncer: &Debouncer, snapshot: &mut RawInputSnapshot, now: u64) {
        for line in LogicalLine::ALL {
            let raw = snapshot.get(line);
            let accepted = debouncer.debounce(raw, &mut self.entries[line.index()], now);
            if accepted != raw {
                debug!("Held {} at {} (bounce at tick {})", line, accepted, now);
            }
            snapshot.set(line, accepted);
        }
    }
}

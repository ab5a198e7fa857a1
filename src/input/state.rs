use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::input::lines::LogicalLine;
use crate::input::stick::StickState;

// Axis value for a centered stick
pub const STICK_CENTER: u8 = 0x80;

// One contact on the touch surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TouchPoint {
    pub active: bool,
    pub x: u16,
    pub y: u16,
}

// Passthrough payload copied into every output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TouchpadData {
    pub touches: [TouchPoint; 2],
}

/// One boolean per logical line plus the touchpad payload, produced once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawInputSnapshot {
    lines: [bool; LogicalLine::COUNT],
    pub touchpad: TouchpadData,
}

impl RawInputSnapshot {
    pub fn get(&self, line: LogicalLine) -> bool {
        self.lines[line.index()]
    }

    pub fn set(&mut self, line: LogicalLine, value: bool) {
        self.lines[line.index()] = value;
    }

    /// Builder-style helper for asserting a set of lines.
    pub fn with(mut self, lines: &[LogicalLine]) -> Self {
        for line in lines {
            self.set(*line, true);
        }
        self
    }

    pub fn asserted(&self) -> impl Iterator<Item = LogicalLine> + '_ {
        LogicalLine::ALL
            .iter()
            .copied()
            .filter(move |line| self.get(*line))
    }
}

// Parses whitespace separated names of asserted lines, e.g. "stick_up button_south"
impl FromStr for RawInputSnapshot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut snapshot = RawInputSnapshot::default();
        for token in s.split_whitespace() {
            snapshot.set(token.parse()?, true);
        }
        Ok(snapshot)
    }
}

/// Final controller state handed to the host protocol layer.
///
/// Only one of `dpad`, the left stick and the right stick carries directional
/// input in a given cycle; the other two stay at `Neutral` / `STICK_CENTER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedInputState {
    pub button_north: bool,
    pub button_east: bool,
    pub button_south: bool,
    pub button_west: bool,
    pub button_l1: bool,
    pub button_l2: bool,
    pub button_l3: bool,
    pub button_r1: bool,
    pub button_r2: bool,
    pub button_r3: bool,
    pub button_select: bool,
    pub button_start: bool,
    pub button_home: bool,
    pub button_touchpad: bool,

    pub dpad: StickState,
    pub left_stick_x: u8,
    pub left_stick_y: u8,
    pub right_stick_x: u8,
    pub right_stick_y: u8,

    pub touchpad_data: TouchpadData,
}

impl Default for NormalizedInputState {
    fn default() -> Self {
        Self {
            button_north: false,
            button_east: false,
            button_south: false,
            button_west: false,
            button_l1: false,
            button_l2: false,
            button_l3: false,
            button_r1: false,
            button_r2: false,
            button_r3: false,
            button_select: false,
            button_start: false,
            button_home: false,
            button_touchpad: false,
            dpad: StickState::Neutral,
            left_stick_x: STICK_CENTER,
            left_stick_y: STICK_CENTER,
            right_stick_x: STICK_CENTER,
            right_stick_y: STICK_CENTER,
            touchpad_data: TouchpadData::default(),
        }
    }
}

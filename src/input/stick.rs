//! Directional synthesis: four raw direction lines become one of three outputs.
//!
//! Opposing directions on the same axis cancel to neutral (SOCD cleaning).
//! The vertical axis follows screen convention, so positive means down.

use serde::{Deserialize, Serialize};

use crate::input::lines::LogicalLine;
use crate::input::state::{NormalizedInputState, RawInputSnapshot, STICK_CENTER};

// 8-way pad direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StickState {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    #[default]
    Neutral,
}

/// Signed per-axis intent, each component in {-1, 0, 1}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StickIntent {
    pub horizontal: i8,
    pub vertical: i8,
}

impl StickIntent {
    pub fn from_directions(up: bool, down: bool, left: bool, right: bool) -> Self {
        let mut intent = StickIntent::default();
        if up {
            intent.vertical -= 1;
        }
        if down {
            intent.vertical += 1;
        }
        if right {
            intent.horizontal += 1;
        }
        if left {
            intent.horizontal -= 1;
        }
        intent
    }

    pub fn from_snapshot(snapshot: &RawInputSnapshot) -> Self {
        Self::from_directions(
            snapshot.get(LogicalLine::StickUp),
            snapshot.get(LogicalLine::StickDown),
            snapshot.get(LogicalLine::StickLeft),
            snapshot.get(LogicalLine::StickRight),
        )
    }

    pub fn compass(self) -> StickState {
        match (self.horizontal, self.vertical) {
            (0, -1) => StickState::North,
            (1, -1) => StickState::NorthEast,
            (1, 0) => StickState::East,
            (1, 1) => StickState::SouthEast,
            (0, 1) => StickState::South,
            (-1, 1) => StickState::SouthWest,
            (-1, 0) => StickState::West,
            (-1, -1) => StickState::NorthWest,
            _ => StickState::Neutral,
        }
    }
}

/// Scales a sign to an 8-bit axis: 0x00, 0x80 or 0xFF.
pub fn stick_scale(sign: i8) -> u8 {
    match sign {
        s if s < 0 => 0x00,
        0 => STICK_CENTER,
        _ => 0xFF,
    }
}

// Which representation carries directional input this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputMode {
    #[default]
    DigitalPad,
    LeftStick,
    RightStick,
}

// Mode lines in priority order; the pad is the fallback, not a match
const MODE_LINES: [(LogicalLine, OutputMode); 2] = [
    (LogicalLine::ModeLs, OutputMode::LeftStick),
    (LogicalLine::ModeRs, OutputMode::RightStick),
];

impl OutputMode {
    pub fn select(snapshot: &RawInputSnapshot) -> Self {
        MODE_LINES
            .iter()
            .find(|(line, _)| snapshot.get(*line))
            .map(|(_, mode)| *mode)
            .unwrap_or_default()
    }
}

/// Writes the directional fields of `out`; the inactive representations are reset.
pub fn synthesize(snapshot: &RawInputSnapshot, out: &mut NormalizedInputState) -> OutputMode {
    let intent = StickIntent::from_snapshot(snapshot);
    let mode = OutputMode::select(snapshot);

    out.dpad = StickState::Neutral;
    out.left_stick_x = STICK_CENTER;
    out.left_stick_y = STICK_CENTER;
    out.right_stick_x = STICK_CENTER;
    out.right_stick_y = STICK_CENTER;

    match mode {
        OutputMode::DigitalPad => out.dpad = intent.compass(),
        OutputMode::LeftStick => {
            out.left_stick_x = stick_scale(intent.horizontal);
            out.left_stick_y = stick_scale(intent.vertical);
        }
        OutputMode::RightStick => {
            out.right_stick_x = stick_scale(intent.horizontal);
            out.right_stick_y = stick_scale(intent.vertical);
        }
    }

    mode
}

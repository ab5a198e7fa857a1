use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::input::InputError;

// Logical input line, independent of its wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalLine {
    ButtonNorth,
    ButtonEast,
    ButtonSouth,
    ButtonWest,
    ButtonL1,
    ButtonL2,
    ButtonL3,
    ButtonR1,
    ButtonR2,
    ButtonR3,
    ButtonSelect,
    ButtonStart,
    ButtonHome,
    ButtonTouchpad,
    StickUp,
    StickDown,
    StickLeft,
    StickRight,
    ModeLs,
    ModeRs,
    ModeLock,
}

impl LogicalLine {
    pub const COUNT: usize = 21;

    pub const ALL: [LogicalLine; Self::COUNT] = [
        LogicalLine::ButtonNorth,
        LogicalLine::ButtonEast,
        LogicalLine::ButtonSouth,
        LogicalLine::ButtonWest,
        LogicalLine::ButtonL1,
        LogicalLine::ButtonL2,
        LogicalLine::ButtonL3,
        LogicalLine::ButtonR1,
        LogicalLine::ButtonR2,
        LogicalLine::ButtonR3,
        LogicalLine::ButtonSelect,
        LogicalLine::ButtonStart,
        LogicalLine::ButtonHome,
        LogicalLine::ButtonTouchpad,
        LogicalLine::StickUp,
        LogicalLine::StickDown,
        LogicalLine::StickLeft,
        LogicalLine::StickRight,
        LogicalLine::ModeLs,
        LogicalLine::ModeRs,
        LogicalLine::ModeLock,
    ];

    /// Position of the line in snapshot and history tables.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            LogicalLine::ButtonNorth => "button_north",
            LogicalLine::ButtonEast => "button_east",
            LogicalLine::ButtonSouth => "button_south",
            LogicalLine::ButtonWest => "button_west",
            LogicalLine::ButtonL1 => "button_l1",
            LogicalLine::ButtonL2 => "button_l2",
            LogicalLine::ButtonL3 => "button_l3",
            LogicalLine::ButtonR1 => "button_r1",
            LogicalLine::ButtonR2 => "button_r2",
            LogicalLine::ButtonR3 => "button_r3",
            LogicalLine::ButtonSelect => "button_select",
            LogicalLine::ButtonStart => "button_start",
            LogicalLine::ButtonHome => "button_home",
            LogicalLine::ButtonTouchpad => "button_touchpad",
            LogicalLine::StickUp => "stick_up",
            LogicalLine::StickDown => "stick_down",
            LogicalLine::StickLeft => "stick_left",
            LogicalLine::StickRight => "stick_right",
            LogicalLine::ModeLs => "mode_ls",
            LogicalLine::ModeRs => "mode_rs",
            LogicalLine::ModeLock => "mode_lock",
        }
    }
}

impl fmt::Display for LogicalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogicalLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogicalLine::ALL
            .iter()
            .copied()
            .find(|line| line.name() == s)
            .ok_or_else(|| format!("unknown input line '{}'", s))
    }
}

// Electrical polarity of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Polarity {
    #[default]
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    /// Converts a raw pin level into the logical pressed value.
    pub fn apply(self, level: bool) -> bool {
        match self {
            Polarity::ActiveHigh => level,
            Polarity::ActiveLow => !level,
        }
    }
}

// Pull bias requested when the pin is configured as an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pull {
    #[default]
    None,
    Up,
    Down,
}

/// Wiring of one logical line: which port it lives on and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDescriptor {
    pub name: LogicalLine,
    pub port: String,
    pub pin: u8,
    #[serde(default)]
    pub active_low: bool,
    #[serde(default)]
    pub pull: Pull,
}

impl LineDescriptor {
    pub fn polarity(&self) -> Polarity {
        if self.active_low {
            Polarity::ActiveLow
        } else {
            Polarity::ActiveHigh
        }
    }
}

/// Ordered table of configured lines, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct LineTable {
    lines: Vec<LineDescriptor>,
}

impl LineTable {
    pub fn new(lines: Vec<LineDescriptor>) -> Result<Self, InputError> {
        let mut seen = [false; LogicalLine::COUNT];
        for descriptor in &lines {
            let slot = &mut seen[descriptor.name.index()];
            if *slot {
                return Err(InputError::DuplicateLine(descriptor.name));
            }
            *slot = true;
        }
        Ok(Self { lines })
    }

    pub fn contains(&self, line: LogicalLine) -> bool {
        self.lines.iter().any(|descriptor| descriptor.name == line)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineDescriptor> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

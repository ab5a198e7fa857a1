use std::fmt::Debug;
use tracing::info;

use crate::input::state::NormalizedInputState;

/// Status indicator collaborator, told about lock transitions only.
pub trait StatusDisplay: Debug + Send + 'static {
    fn set_locked_indicator(&mut self, locked: bool);
}

// Display stand-in that reports the indicator through the log
#[derive(Debug, Default)]
pub struct LogDisplay;

impl StatusDisplay for LogDisplay {
    fn set_locked_indicator(&mut self, locked: bool) {
        info!("Lock indicator {}", if locked { "on" } else { "off" });
    }
}

/// Suppresses select, start and home while locked.
#[derive(Debug)]
pub struct LockGate {
    locked: bool,
    display: Box<dyn StatusDisplay>,
}

impl LockGate {
    pub fn new(display: Box<dyn StatusDisplay>) -> Self {
        Self {
            locked: false,
            display,
        }
    }

    pub fn get_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        if locked != self.locked {
            info!("Input lock {}", if locked { "engaged" } else { "released" });
            self.display.set_locked_indicator(locked);
        }
        self.locked = locked;
    }

    pub fn apply(&self, out: &mut NormalizedInputState) {
        if self.locked {
            out.button_select = false;
            out.button_start = false;
            out.button_home = false;
        }
    }
}

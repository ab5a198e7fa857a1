//! Per-cycle orchestration of the input pipeline.
//!
//! The core starts [`Unbound`] with nothing but its line table and timing, gets a
//! raw state source attached, and only then can be polled. All mutable state
//! (debounce history, lock flag, port cache inside the source) is owned here and
//! touched only through `&mut self`.

use serde::{Deserialize, Serialize};
use statum::{machine, state};
use std::fmt::Debug;
use tracing::{debug, info};

use crate::input::debounce::{Debouncer, HistoryTable};
use crate::input::lines::{LineTable, LogicalLine};
use crate::input::lock::{LockGate, StatusDisplay};
use crate::input::source::{NullSource, RawStateSource};
use crate::input::state::{NormalizedInputState, RawInputSnapshot, TouchpadData};
use crate::input::stick;
use crate::input::tick::TickSource;
use crate::input::InputError;

/// Read-only provider of the touchpad payload.
pub trait PayloadSource: Debug + Send + 'static {
    fn touchpad(&self) -> TouchpadData;
}

// Whether stick synthesis sees debounced or raw directional lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickInput {
    #[default]
    Debounced,
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineSettings {
    pub debouncer: Debouncer,
    pub stick_input: StickInput,
}

#[state]
#[derive(Debug, Clone)]
pub enum CoreStage {
    Unbound, // Line table and timing known, no acquisition yet
    Polling, // Source attached, poll() available
}

#[machine]
pub struct InputCore<S: CoreStage> {
    lines: LineTable,
    settings: PipelineSettings,
    source: Box<dyn RawStateSource>,
    history: HistoryTable,
    lock: LockGate,
    clock: Box<dyn TickSource>,
    payload: Option<Box<dyn PayloadSource>>,
}

impl<S: CoreStage> InputCore<S> {
    pub fn get_locked(&self) -> bool {
        self.lock.get_locked()
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.lock.set_locked(locked);
    }
}

impl InputCore<Unbound> {
    pub fn create(
        lines: LineTable,
        settings: PipelineSettings,
        clock: Box<dyn TickSource>,
        display: Box<dyn StatusDisplay>,
    ) -> Self {
        info!(
            "Creating input core: {} lines, dwell {} ticks ({} ticks/ms), stick input {:?}",
            lines.len(),
            settings.debouncer.min_dwell_ticks(),
            clock.ticks_per_ms(),
            settings.stick_input
        );

        Self::new(
            lines,
            settings,
            Box::new(NullSource::default()),
            HistoryTable::default(),
            LockGate::new(display),
            clock,
            None, // payload
        )
    }

    pub fn with_payload(mut self, payload: Box<dyn PayloadSource>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attaches the acquisition strategy and makes the core pollable.
    pub fn attach(mut self, source: Box<dyn RawStateSource>) -> InputCore<Polling> {
        info!("Attaching {} input source", source.name());
        self.source = source;
        self.transition()
    }
}

impl InputCore<Polling> {
    /// Runs one full cycle. Any error is a hardware fault and must halt the caller.
    pub fn poll(&mut self) -> Result<NormalizedInputState, InputError> {
        let raw = self.source.read()?;
        let now = self.clock.now();

        // Debounce every line against the same tick
        let mut input = raw;
        self.history.apply(&self.settings.debouncer, &mut input, now);

        if self.lines.contains(LogicalLine::ModeLock) {
            self.lock.set_locked(input.get(LogicalLine::ModeLock));
        }

        let mut out = NormalizedInputState {
            button_north: input.get(LogicalLine::ButtonNorth),
            button_east: input.get(LogicalLine::ButtonEast),
            button_south: input.get(LogicalLine::ButtonSouth),
            button_west: input.get(LogicalLine::ButtonWest),
            button_l1: input.get(LogicalLine::ButtonL1),
            button_l2: input.get(LogicalLine::ButtonL2),
            button_l3: input.get(LogicalLine::ButtonL3),
            button_r1: input.get(LogicalLine::ButtonR1),
            button_r2: input.get(LogicalLine::ButtonR2),
            button_r3: input.get(LogicalLine::ButtonR3),
            button_select: input.get(LogicalLine::ButtonSelect),
            button_start: input.get(LogicalLine::ButtonStart),
            button_home: input.get(LogicalLine::ButtonHome),
            button_touchpad: input.get(LogicalLine::ButtonTouchpad),
            ..Default::default()
        };
        self.lock.apply(&mut out);

        let directional: &RawInputSnapshot = match self.settings.stick_input {
            StickInput::Debounced => &input,
            StickInput::Raw => &raw,
        };
        let mode = stick::synthesize(directional, &mut out);

        out.touchpad_data = match &self.payload {
            Some(payload) => payload.touchpad(),
            None => raw.touchpad,
        };

        debug!("Polled at tick {}: mode {:?}, dpad {:?}", now, mode, out.dpad);
        Ok(out)
    }
}

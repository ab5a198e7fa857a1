//! Raw state acquisition.
//!
//! Every source checks the override queue first, then falls back to its own
//! acquisition: all-released for [`NullSource`], the held snapshot for
//! [`ExternalSource`], one batched read per port for [`PhysicalSource`].

use std::fmt::Debug;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::input::lines::{LineTable, LogicalLine, Polarity};
use crate::input::port::{DeviceBinder, PortDevice};
use crate::input::port_cache::PortCache;
use crate::input::state::RawInputSnapshot;
use crate::input::InputError;

pub trait RawStateSource: Debug + Send + 'static {
    /// Produces this cycle's snapshot. Errors are fatal to the pipeline.
    fn read(&mut self) -> Result<RawInputSnapshot, InputError>;

    fn name(&self) -> &'static str;
}

// Producer side of the override queue
#[derive(Debug, Clone)]
pub struct OverrideQueue {
    sender: mpsc::Sender<RawInputSnapshot>,
}

impl OverrideQueue {
    pub fn push(&self, snapshot: RawInputSnapshot) -> Result<(), InputError> {
        self.sender
            .try_send(snapshot)
            .map_err(|e| InputError::OverrideRejected(e.to_string()))
    }
}

/// Consumer side of the override queue, held by a source.
#[derive(Debug, Default)]
pub struct OverrideSlot {
    queue: Option<mpsc::Receiver<RawInputSnapshot>>,
}

impl OverrideSlot {
    /// Creates a bounded override queue and the slot that drains it.
    pub fn channel(capacity: usize) -> (OverrideQueue, OverrideSlot) {
        let (sender, receiver) = mpsc::channel(capacity);
        (
            OverrideQueue { sender },
            OverrideSlot {
                queue: Some(receiver),
            },
        )
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    // At most one queued snapshot per cycle
    fn take(&mut self) -> Option<RawInputSnapshot> {
        let queue = self.queue.as_mut()?;
        match queue.try_recv() {
            Ok(snapshot) => {
                debug!("Using queued override snapshot");
                Some(snapshot)
            }
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                warn!("Override queue disconnected, disabling queued overrides");
                self.queue = None;
                None
            }
        }
    }
}

// No acquisition: queued overrides or all lines released
#[derive(Debug, Default)]
pub struct NullSource {
    overrides: OverrideSlot,
}

impl NullSource {
    pub fn new(overrides: OverrideSlot) -> Self {
        Self { overrides }
    }
}

impl RawStateSource for NullSource {
    fn read(&mut self) -> Result<RawInputSnapshot, InputError> {
        Ok(self.overrides.take().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Handle for setting the held snapshot of an [`ExternalSource`] from another context.
#[derive(Debug, Clone)]
pub struct ExternalHandle {
    sender: watch::Sender<RawInputSnapshot>,
}

impl ExternalHandle {
    /// Replaces the held snapshot; the next poll sees the latest write.
    pub fn set_raw_override(&self, snapshot: RawInputSnapshot) {
        self.sender.send_replace(snapshot);
    }
}

#[derive(Debug)]
pub struct ExternalSource {
    overrides: OverrideSlot,
    held: watch::Receiver<RawInputSnapshot>,
}

impl ExternalSource {
    pub fn new(overrides: OverrideSlot) -> (Self, ExternalHandle) {
        let (sender, held) = watch::channel(RawInputSnapshot::default());
        (Self { overrides, held }, ExternalHandle { sender })
    }
}

impl RawStateSource for ExternalSource {
    fn read(&mut self) -> Result<RawInputSnapshot, InputError> {
        if let Some(snapshot) = self.overrides.take() {
            return Ok(snapshot);
        }
        // The whole snapshot is swapped by the writer, never partially updated
        let snapshot = *self.held.borrow();
        Ok(snapshot)
    }

    fn name(&self) -> &'static str {
        "external"
    }
}

// Where one line's bit lives
#[derive(Debug, Clone, Copy)]
struct LineSlot {
    line: LogicalLine,
    port: usize,
    bit: u8,
    polarity: Polarity,
}

#[derive(Debug)]
pub struct PhysicalSource<D> {
    overrides: OverrideSlot,
    ports: PortCache<D>,
    slots: Vec<LineSlot>,
}

impl<D: PortDevice> PhysicalSource<D> {
    /// Binds every configured line and caches the ports they live on.
    pub fn bind<B>(
        lines: &LineTable,
        binder: &mut B,
        overrides: OverrideSlot,
    ) -> Result<Self, InputError>
    where
        B: DeviceBinder<Device = D>,
    {
        let mut ports = PortCache::new();
        let mut slots = Vec::with_capacity(lines.len());

        for descriptor in lines.iter() {
            let binding = binder.bind(descriptor)?;
            if binding.bit >= 32 {
                return Err(InputError::BindFailed {
                    line: Some(descriptor.name),
                    reason: format!("bit offset {} outside port word", binding.bit),
                });
            }
            let port = ports.register(binding.device)?;
            slots.push(LineSlot {
                line: descriptor.name,
                port,
                bit: binding.bit,
                polarity: binding.polarity,
            });
        }

        info!(
            "Bound {} input lines across {} ports",
            slots.len(),
            ports.len()
        );
        Ok(Self {
            overrides,
            ports,
            slots,
        })
    }
}

impl<D: PortDevice> RawStateSource for PhysicalSource<D> {
    fn read(&mut self) -> Result<RawInputSnapshot, InputError> {
        if let Some(snapshot) = self.overrides.take() {
            return Ok(snapshot);
        }

        let words = self.ports.read_all()?;

        let mut snapshot = RawInputSnapshot::default();
        for slot in &self.slots {
            let level = words[slot.port] & (1u32 << slot.bit) != 0;
            snapshot.set(slot.line, slot.polarity.apply(level));
        }
        Ok(snapshot)
    }

    fn name(&self) -> &'static str {
        "physical"
    }
}

use tracing::{debug, info};

use crate::input::port::PortDevice;
use crate::input::InputError;

// Upper bound on distinct ports a line table may span
pub const PORT_CACHE_CAPACITY: usize = 4;

/// Fixed-capacity cache of port handles, searched linearly by label.
#[derive(Debug)]
pub struct PortCache<D> {
    devices: Vec<D>,
}

impl<D: PortDevice> PortCache<D> {
    pub fn new() -> Self {
        Self {
            devices: Vec::with_capacity(PORT_CACHE_CAPACITY),
        }
    }

    /// Caches `device` and returns its index. A device whose label is already
    /// cached keeps its existing index and the new handle is dropped.
    pub fn register(&mut self, device: D) -> Result<usize, InputError> {
        if let Some(index) = self
            .devices
            .iter()
            .position(|cached| cached.label() == device.label())
        {
            debug!("Port {} already cached at index {}", device.label(), index);
            return Ok(index);
        }

        if self.devices.len() == PORT_CACHE_CAPACITY {
            return Err(InputError::PortCacheFull {
                capacity: PORT_CACHE_CAPACITY,
                port: device.label().to_string(),
            });
        }

        let index = self.devices.len();
        info!("Caching port {} at index {}", device.label(), index);
        self.devices.push(device);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// One batched read per cached port, in index order.
    pub fn read_all(&mut self) -> Result<[u32; PORT_CACHE_CAPACITY], InputError> {
        let mut words = [0u32; PORT_CACHE_CAPACITY];
        for (word, device) in words.iter_mut().zip(self.devices.iter_mut()) {
            *word = device.read_raw()?;
        }
        Ok(words)
    }
}

impl<D: PortDevice> Default for PortCache<D> {
    fn default() -> Self {
        Self::new()
    }
}

use rppal::gpio::{Gpio, InputPin};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::input::lines::{LineDescriptor, Polarity, Pull};
use crate::input::InputError;

/// A group of input lines read in one batched operation.
///
/// Devices are identified by their label: two handles with the same label refer to
/// the same hardware port.
pub trait PortDevice: Debug + Send + 'static {
    fn label(&self) -> &str;

    /// Reads every pin of the port at once, bit `n` holding the level of pin `n`.
    fn read_raw(&mut self) -> Result<u32, InputError>;
}

// Result of binding one logical line to hardware
#[derive(Debug)]
pub struct Binding<D> {
    pub device: D,
    pub bit: u8,
    pub polarity: Polarity,
}

/// Resolves logical lines to port handles at startup.
pub trait DeviceBinder {
    type Device: PortDevice;

    fn bind(&mut self, line: &LineDescriptor) -> Result<Binding<Self::Device>, InputError>;
}

// Raspberry Pi GPIO bank shared by every line bound to the same port label
#[derive(Debug, Clone)]
pub struct RpiBank {
    label: String,
    pins: Arc<Mutex<Vec<InputPin>>>,
}

impl PortDevice for RpiBank {
    fn label(&self) -> &str {
        &self.label
    }

    fn read_raw(&mut self) -> Result<u32, InputError> {
        let pins = self.pins.lock().map_err(|e| InputError::PortFault {
            port: self.label.clone(),
            reason: e.to_string(),
        })?;

        Ok(pins.iter().fold(0u32, |word, pin| {
            if pin.is_high() {
                word | (1u32 << pin.pin())
            } else {
                word
            }
        }))
    }
}

#[derive(Debug)]
pub struct RpiBinder {
    gpio: Gpio,
    banks: HashMap<String, RpiBank>,
}

impl RpiBinder {
    pub fn new() -> Result<Self, InputError> {
        info!("Opening Raspberry Pi GPIO peripheral");
        let gpio = Gpio::new().map_err(|e| InputError::BindFailed {
            line: None,
            reason: format!("failed to open gpio: {}", e),
        })?;
        Ok(Self {
            gpio,
            banks: HashMap::new(),
        })
    }
}

impl DeviceBinder for RpiBinder {
    type Device = RpiBank;

    fn bind(&mut self, line: &LineDescriptor) -> Result<Binding<RpiBank>, InputError> {
        let pin = self.gpio.get(line.pin).map_err(|e| InputError::BindFailed {
            line: Some(line.name),
            reason: format!("failed to find pin {} on {}: {}", line.pin, line.port, e),
        })?;

        let input = match line.pull {
            Pull::None => pin.into_input(),
            Pull::Up => pin.into_input_pullup(),
            Pull::Down => pin.into_input_pulldown(),
        };
        debug!(
            "Configured {} as input (port = {}, pin = {}, pull = {:?})",
            line.name, line.port, line.pin, line.pull
        );

        let bank = self
            .banks
            .entry(line.port.clone())
            .or_insert_with(|| RpiBank {
                label: line.port.clone(),
                pins: Arc::new(Mutex::new(Vec::new())),
            })
            .clone();

        bank.pins
            .lock()
            .map_err(|e| InputError::BindFailed {
                line: Some(line.name),
                reason: e.to_string(),
            })?
            .push(input);

        Ok(Binding {
            device: bank,
            bit: line.pin,
            polarity: line.polarity(),
        })
    }
}

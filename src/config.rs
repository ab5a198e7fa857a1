use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::input::debounce::{Debouncer, DEFAULT_DEBOUNCE_MS};
use crate::input::tick::DEFAULT_TICKS_PER_MS;
use crate::input::{LineDescriptor, LineTable, PipelineSettings, StickInput};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// Acquisition strategy chosen at startup
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Acquisition {
    #[default]
    Physical,
    External,
    None,
}

/// Runtime configuration of the input core, loaded from TOML.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
    pub ticks_per_ms: u64,
    pub acquisition: Acquisition,
    pub override_queue: bool,
    pub stick_input: StickInput,
    pub lines: Vec<LineDescriptor>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            ticks_per_ms: DEFAULT_TICKS_PER_MS,
            acquisition: Acquisition::default(),
            override_queue: true,
            stick_input: StickInput::default(),
            lines: Vec::new(),
        }
    }
}

impl InputConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: InputConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading configuration from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// `<config dir>/padcore/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("padcore").join("config.toml"))
    }

    /// Loads an explicit path, else the default location, else built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            info!("Loading configuration from {}", path.display());
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            _ => {
                warn!("No configuration file found, using defaults (no input lines bound)");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.ticks_per_ms == 0 {
            return Err(ConfigError::Invalid(
                "ticks_per_ms must be at least 1".to_string(),
            ));
        }
        if let Some(line) = self.lines.iter().find(|line| line.pin >= 32) {
            return Err(ConfigError::Invalid(format!(
                "{} uses pin {}, ports are 32 bits wide",
                line.name, line.pin
            )));
        }
        self.line_table()?;
        Ok(())
    }

    pub fn line_table(&self) -> Result<LineTable, ConfigError> {
        LineTable::new(self.lines.clone()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            debouncer: Debouncer::from_millis(self.debounce_ms, self.ticks_per_ms),
            stick_input: self.stick_input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{LogicalLine, Polarity, Pull};

    const SAMPLE: &str = include_str!("../padcore.toml");

    #[test]
    fn sample_configuration_parses() {
        let config = InputConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.acquisition, Acquisition::Physical);
        assert_eq!(config.debounce_ms, 5);

        let table = config.line_table().unwrap();
        assert!(table.contains(LogicalLine::ModeLock));

        let up = table
            .iter()
            .find(|line| line.name == LogicalLine::StickUp)
            .unwrap();
        assert_eq!(up.polarity(), Polarity::ActiveLow);
        assert_eq!(up.pull, Pull::Up);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = InputConfig::from_toml("acquisition = \"external\"").unwrap();
        assert_eq!(config.acquisition, Acquisition::External);
        assert_eq!(config.poll_interval_ms, 1);
        assert!(config.override_queue);
        assert!(config.lines.is_empty());
    }

    #[test]
    fn dwell_uses_tick_rate() {
        let config = InputConfig {
            debounce_ms: 5,
            ticks_per_ms: 32,
            ..Default::default()
        };
        assert_eq!(config.pipeline_settings().debouncer.min_dwell_ticks(), 160);
    }

    #[test]
    fn default_settings_match_default_config() {
        let config = InputConfig::default();
        assert_eq!(config.pipeline_settings(), PipelineSettings::default());
        assert_eq!(
            PipelineSettings::default().debouncer.min_dwell_ticks(),
            config.debounce_ms * config.ticks_per_ms
        );
    }

    #[test]
    fn duplicate_line_is_invalid() {
        let text = r#"
            [[lines]]
            name = "button_start"
            port = "gpio0"
            pin = 3

            [[lines]]
            name = "button_start"
            port = "gpio0"
            pin = 4
        "#;
        assert!(matches!(
            InputConfig::from_toml(text),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn wide_pin_is_invalid() {
        let text = r#"
            [[lines]]
            name = "button_start"
            port = "gpio1"
            pin = 40
        "#;
        assert!(matches!(
            InputConfig::from_toml(text),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn unknown_line_name_fails_to_parse() {
        let text = r#"
            [[lines]]
            name = "button_turbo"
            port = "gpio0"
            pin = 1
        "#;
        assert!(matches!(
            InputConfig::from_toml(text),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn zero_poll_interval_is_invalid() {
        assert!(InputConfig::from_toml("poll_interval_ms = 0").is_err());
    }
}

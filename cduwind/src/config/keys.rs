//! Configuration key access and validation.
//!
//! This module provides a type-safe interface for getting and setting
//! configuration values by key name, with validation via the Specification Pattern.

use std::str::FromStr;
use thiserror::Error;

use super::parser::{expand_tilde, parse_bool, parse_map};
use super::settings::ConfigFile;
use super::writer::path_to_string;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
///
/// Each key maps to a specific field in [`ConfigFile`] and knows how to
/// get and set its value with proper validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Ingestion settings
    IngestionEnabled,
    IngestionPort,
    IngestionMaxLineLength,

    // Control settings
    ControlHost,
    ControlSendPort,
    ControlReceivePort,

    // Sequence settings
    SequencePressDelayMs,
    SequenceReleaseDelayMs,
    SequenceLineSelectDelayMs,
    SequencePageHoldMs,
    SequencePageSettleMs,
    SequenceErrorSettleMs,

    // Wind settings
    WindMap,

    // Logging settings
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "control.send_port").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::IngestionEnabled => "ingestion.enabled",
            ConfigKey::IngestionPort => "ingestion.port",
            ConfigKey::IngestionMaxLineLength => "ingestion.max_line_length",
            ConfigKey::ControlHost => "control.host",
            ConfigKey::ControlSendPort => "control.send_port",
            ConfigKey::ControlReceivePort => "control.receive_port",
            ConfigKey::SequencePressDelayMs => "sequence.press_delay_ms",
            ConfigKey::SequenceReleaseDelayMs => "sequence.release_delay_ms",
            ConfigKey::SequenceLineSelectDelayMs => "sequence.line_select_delay_ms",
            ConfigKey::SequencePageHoldMs => "sequence.page_hold_ms",
            ConfigKey::SequencePageSettleMs => "sequence.page_settle_ms",
            ConfigKey::SequenceErrorSettleMs => "sequence.error_settle_ms",
            ConfigKey::WindMap => "wind.map",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "control").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "send_port").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::IngestionEnabled => config.ingestion.enabled.to_string(),
            ConfigKey::IngestionPort => config.ingestion.port.to_string(),
            ConfigKey::IngestionMaxLineLength => config.ingestion.max_line_length.to_string(),
            ConfigKey::ControlHost => config.control.host.clone(),
            ConfigKey::ControlSendPort => config.control.send_port.to_string(),
            ConfigKey::ControlReceivePort => config.control.receive_port.to_string(),
            ConfigKey::SequencePressDelayMs => config.sequence.press_delay_ms.to_string(),
            ConfigKey::SequenceReleaseDelayMs => config.sequence.release_delay_ms.to_string(),
            ConfigKey::SequenceLineSelectDelayMs => {
                config.sequence.line_select_delay_ms.to_string()
            }
            ConfigKey::SequencePageHoldMs => config.sequence.page_hold_ms.to_string(),
            ConfigKey::SequencePageSettleMs => config.sequence.page_settle_ms.to_string(),
            ConfigKey::SequenceErrorSettleMs => config.sequence.error_settle_ms.to_string(),
            ConfigKey::WindMap => config
                .wind
                .map
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            ConfigKey::LoggingFile => path_to_string(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value according to the key's specification before setting.
    /// The config is left unchanged when validation fails.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.validate(value)?;
        let value = value.trim();

        match self {
            ConfigKey::IngestionEnabled => config.ingestion.enabled = parse_bool(value),
            ConfigKey::IngestionPort => config.ingestion.port = self.parse(value)?,
            ConfigKey::IngestionMaxLineLength => {
                config.ingestion.max_line_length = self.parse(value)?
            }
            ConfigKey::ControlHost => config.control.host = value.to_string(),
            ConfigKey::ControlSendPort => config.control.send_port = self.parse(value)?,
            ConfigKey::ControlReceivePort => config.control.receive_port = self.parse(value)?,
            ConfigKey::SequencePressDelayMs => config.sequence.press_delay_ms = self.parse(value)?,
            ConfigKey::SequenceReleaseDelayMs => {
                config.sequence.release_delay_ms = self.parse(value)?
            }
            ConfigKey::SequenceLineSelectDelayMs => {
                config.sequence.line_select_delay_ms = self.parse(value)?
            }
            ConfigKey::SequencePageHoldMs => config.sequence.page_hold_ms = self.parse(value)?,
            ConfigKey::SequencePageSettleMs => config.sequence.page_settle_ms = self.parse(value)?,
            ConfigKey::SequenceErrorSettleMs => {
                config.sequence.error_settle_ms = self.parse(value)?
            }
            ConfigKey::WindMap => {
                config.wind.map = parse_map(value).map_err(|reason| self.failed(reason))?
            }
            ConfigKey::LoggingFile => config.logging.file = expand_tilde(value),
        }
        Ok(())
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value.trim())
            .map_err(|reason| self.failed(reason))
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::IngestionEnabled,
            ConfigKey::IngestionPort,
            ConfigKey::IngestionMaxLineLength,
            ConfigKey::ControlHost,
            ConfigKey::ControlSendPort,
            ConfigKey::ControlReceivePort,
            ConfigKey::SequencePressDelayMs,
            ConfigKey::SequenceReleaseDelayMs,
            ConfigKey::SequenceLineSelectDelayMs,
            ConfigKey::SequencePageHoldMs,
            ConfigKey::SequencePageSettleMs,
            ConfigKey::SequenceErrorSettleMs,
            ConfigKey::WindMap,
            ConfigKey::LoggingFile,
        ]
    }

    /// Get the validation specification for this key.
    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::IngestionEnabled => Box::new(BooleanSpec),
            ConfigKey::IngestionPort | ConfigKey::ControlSendPort | ConfigKey::ControlReceivePort => {
                Box::new(PortSpec)
            }
            ConfigKey::IngestionMaxLineLength => Box::new(NonZeroIntegerSpec),
            ConfigKey::ControlHost => Box::new(NonEmptySpec),
            ConfigKey::SequencePressDelayMs
            | ConfigKey::SequenceReleaseDelayMs
            | ConfigKey::SequenceLineSelectDelayMs
            | ConfigKey::SequencePageHoldMs
            | ConfigKey::SequencePageSettleMs
            | ConfigKey::SequenceErrorSettleMs => Box::new(PositiveIntegerSpec),
            ConfigKey::WindMap => Box::new(MapSpec),
            ConfigKey::LoggingFile => Box::new(NonEmptySpec),
        }
    }

    fn parse<T: FromStr>(&self, value: &str) -> Result<T, ConfigKeyError> {
        value
            .parse()
            .map_err(|_| self.failed("could not be parsed".to_string()))
    }

    fn failed(&self, reason: String) -> ConfigKeyError {
        ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason,
        }
    }
}

// ============================================================================
// Value Specifications (Specification Pattern)
// ============================================================================

/// Trait for value validation specifications.
trait ValueSpecification {
    /// Check if the value satisfies this specification.
    /// Returns Ok(()) if valid, Err(reason) if invalid.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// Non-negative integer values.
struct PositiveIntegerSpec;

impl ValueSpecification for PositiveIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        value
            .parse::<u64>()
            .map(|_| ())
            .map_err(|_| "must be a positive integer".to_string())
    }
}

/// Integer values greater than zero.
struct NonZeroIntegerSpec;

impl ValueSpecification for NonZeroIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err("must be an integer greater than zero".to_string()),
        }
    }
}

/// UDP/TCP port numbers.
struct PortSpec;

impl ValueSpecification for PortSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<u16>() {
            Ok(port) if port > 0 => Ok(()),
            _ => Err("must be a port number (1-65535)".to_string()),
        }
    }
}

/// Specification for boolean values.
struct BooleanSpec;

impl ValueSpecification for BooleanSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let lower = value.to_lowercase();
        let valid = ["true", "false", "yes", "no", "1", "0", "on", "off"];
        if valid.contains(&lower.as_str()) {
            Ok(())
        } else {
            Err("must be true/false, yes/no, 1/0, or on/off".to_string())
        }
    }
}

/// Any non-empty value.
struct NonEmptySpec;

impl ValueSpecification for NonEmptySpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            Err("must not be empty".to_string())
        } else {
            Ok(())
        }
    }
}

/// Empty, or one of the canonical map identifiers.
struct MapSpec;

impl ValueSpecification for MapSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        parse_map(value).map(|_| ())
    }
}

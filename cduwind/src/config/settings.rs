//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file. The
//! conversion helpers at the bottom build the runtime configuration of the
//! component each section belongs to.

use std::path::PathBuf;
use std::time::Duration;

use crate::control::ControlLinkConfig;
use crate::ingestion::IngestionConfig;
use crate::sequence::SequenceTiming;
use crate::wind::MapId;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Weather feed listener
    pub ingestion: IngestionSettings,
    /// Control-protocol peer
    pub control: ControlSettings,
    /// Button sequence timing
    pub sequence: SequenceSettings,
    /// Wind computation
    pub wind: WindSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Weather feed listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionSettings {
    /// Whether the TCP listener is started by `run`.
    pub enabled: bool,
    /// Loopback TCP port.
    pub port: u16,
    /// Longest accepted line in bytes.
    pub max_line_length: usize,
}

/// Control-protocol peer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSettings {
    /// Host command datagrams are sent to.
    pub host: String,
    /// Port command datagrams are sent to.
    pub send_port: u16,
    /// Local port status reports arrive on.
    pub receive_port: u16,
}

/// Sequence timing in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSettings {
    pub press_delay_ms: u64,
    pub release_delay_ms: u64,
    pub line_select_delay_ms: u64,
    pub page_hold_ms: u64,
    pub page_settle_ms: u64,
    pub error_settle_ms: u64,
}

/// Wind computation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindSettings {
    /// Fixed map; `None` derives the map from the mission theatre.
    pub map: Option<MapId>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl IngestionSettings {
    /// Server configuration for these settings.
    pub fn server_config(&self) -> IngestionConfig {
        IngestionConfig {
            max_line_length: self.max_line_length,
            ..IngestionConfig::default()
        }
    }
}

impl ControlSettings {
    /// Link configuration for these settings.
    pub fn link_config(&self) -> ControlLinkConfig {
        ControlLinkConfig {
            host: self.host.clone(),
            send_port: self.send_port,
            receive_port: self.receive_port,
            ..ControlLinkConfig::default()
        }
    }
}

impl SequenceSettings {
    pub fn timing(&self) -> SequenceTiming {
        SequenceTiming {
            press: Duration::from_millis(self.press_delay_ms),
            release: Duration::from_millis(self.release_delay_ms),
            line_select: Duration::from_millis(self.line_select_delay_ms),
            page_hold: Duration::from_millis(self.page_hold_ms),
            page_settle: Duration::from_millis(self.page_settle_ms),
            error_settle: Duration::from_millis(self.error_settle_ms),
        }
    }
}

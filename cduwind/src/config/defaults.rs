//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use super::file::config_directory;
use super::settings::*;
use crate::control::{DEFAULT_CONTROL_HOST, DEFAULT_RECEIVE_PORT, DEFAULT_SEND_PORT};
use crate::ingestion::{DEFAULT_INGESTION_PORT, DEFAULT_MAX_LINE_LENGTH};

// =============================================================================
// Sequence timing defaults (milliseconds)
// =============================================================================

/// Delay after pressing a key.
pub const DEFAULT_PRESS_DELAY_MS: u64 = 80;

/// Delay after releasing a digit key.
pub const DEFAULT_RELEASE_DELAY_MS: u64 = 80;

/// Delay after releasing a line-select or function key.
pub const DEFAULT_LINE_SELECT_DELAY_MS: u64 = 250;

/// How long the page switch is held off center.
pub const DEFAULT_PAGE_HOLD_MS: u64 = 200;

/// Delay after the page switch returns to center.
pub const DEFAULT_PAGE_SETTLE_MS: u64 = 300;

/// Delay before reading the status line for an input error.
pub const DEFAULT_ERROR_SETTLE_MS: u64 = 150;

// =============================================================================
// File names
// =============================================================================

/// Config file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "cduwind.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            ingestion: IngestionSettings {
                enabled: true,
                port: DEFAULT_INGESTION_PORT,
                max_line_length: DEFAULT_MAX_LINE_LENGTH,
            },
            control: ControlSettings {
                host: DEFAULT_CONTROL_HOST.to_string(),
                send_port: DEFAULT_SEND_PORT,
                receive_port: DEFAULT_RECEIVE_PORT,
            },
            sequence: SequenceSettings {
                press_delay_ms: DEFAULT_PRESS_DELAY_MS,
                release_delay_ms: DEFAULT_RELEASE_DELAY_MS,
                line_select_delay_ms: DEFAULT_LINE_SELECT_DELAY_MS,
                page_hold_ms: DEFAULT_PAGE_HOLD_MS,
                page_settle_ms: DEFAULT_PAGE_SETTLE_MS,
                error_settle_ms: DEFAULT_ERROR_SETTLE_MS,
            },
            wind: WindSettings { map: None },
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}

//! Configuration for the ingestion server.

use std::time::Duration;

/// Default TCP port for the weather feed.
pub const DEFAULT_INGESTION_PORT: u16 = 10309;

/// Default upper bound for a single line (64 KiB).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// A message must have been parsed within this window for the feed to count
/// as connected.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for [`IngestionServer`](super::IngestionServer).
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Maximum accepted line length in bytes.
    pub max_line_length: usize,

    /// Freshness window for the connectivity signal.
    pub message_timeout: Duration,

    /// How often connectivity is re-evaluated while listening.
    pub liveness_check_interval: Duration,

    /// Capacity of the broadcast channels.
    pub channel_capacity: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
            liveness_check_interval: Duration::from_secs(1),
            channel_capacity: 64,
        }
    }
}

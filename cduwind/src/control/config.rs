//! Configuration for the UDP control link.

use std::time::Duration;

/// Default port the control peer listens on for commands.
pub const DEFAULT_SEND_PORT: u16 = 7778;

/// Default port status reports arrive on.
pub const DEFAULT_RECEIVE_PORT: u16 = 7777;

/// Default control peer host.
pub const DEFAULT_CONTROL_HOST: &str = "127.0.0.1";

/// Configuration for [`UdpControlLink`](super::UdpControlLink).
#[derive(Debug, Clone)]
pub struct ControlLinkConfig {
    /// Host the command datagrams are sent to.
    pub host: String,

    /// Port the command datagrams are sent to.
    pub send_port: u16,

    /// Local address status reports are received on.
    pub receive_host: String,

    /// Local port status reports are received on (0 picks a free port).
    pub receive_port: u16,

    /// Pause after a receive error before trying again.
    pub receive_backoff: Duration,
}

impl Default for ControlLinkConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CONTROL_HOST.to_string(),
            send_port: DEFAULT_SEND_PORT,
            receive_host: "0.0.0.0".to_string(),
            receive_port: DEFAULT_RECEIVE_PORT,
            receive_backoff: Duration::from_millis(100),
        }
    }
}

//! UDP control-protocol client.
//!
//! [`ControlLink`] is the seam the sequence engine is written against;
//! [`UdpControlLink`] talks to the real peer. Outbound commands are
//! `"<NAME> <value>\n"` datagrams and inbound reports update a snapshot of
//! control values, including the status line used for error detection.

mod config;
mod error;
mod link;
mod protocol;
mod udp;

pub use config::{ControlLinkConfig, DEFAULT_CONTROL_HOST, DEFAULT_RECEIVE_PORT, DEFAULT_SEND_PORT};
pub use error::ControlLinkError;
pub use link::{
    is_error_status, ControlLink, CLEAR_CONTROL, CLEAR_SETTLE, STATUS_CONTROL, SWITCH_CENTER,
};
pub use protocol::{format_command, parse_report};
pub use udp::UdpControlLink;

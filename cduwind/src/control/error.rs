//! Error types for the control link.

use thiserror::Error;

/// Errors setting up or using a [`UdpControlLink`](super::UdpControlLink).
#[derive(Debug, Error)]
pub enum ControlLinkError {
    /// The receive socket could not be bound.
    #[error("Failed to bind control receive socket on {addr}: {source}")]
    ReceiveBind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The send socket could not be bound.
    #[error("Failed to bind control send socket: {0}")]
    SendBind(#[source] std::io::Error),

    /// The peer host name did not resolve.
    #[error("Failed to resolve control peer {host}:{port}: {reason}")]
    Resolve {
        host: String,
        port: u16,
        reason: String,
    },
}

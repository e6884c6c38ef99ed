//! Error types for the ingestion server.

use thiserror::Error;

/// Errors reported by [`IngestionServer`](super::IngestionServer).
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The loopback listener could not be bound.
    #[error("Failed to bind ingestion listener on 127.0.0.1:{port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// The bound listener could not report its address.
    #[error("Failed to read ingestion listener address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

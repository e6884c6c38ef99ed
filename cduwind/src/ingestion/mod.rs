//! Weather feed ingestion over loopback TCP.
//!
//! The sender writes one JSON object per line. [`IngestionServer`] frames each
//! connection with [`WeatherLineCodec`], decodes
//! [`WeatherSnapshot`](crate::weather::WeatherSnapshot)s and publishes them on
//! a broadcast channel together with an edge-triggered connectivity signal.

mod codec;
mod config;
mod error;
mod server;

pub use codec::{LineFrame, WeatherLineCodec};
pub use config::{
    IngestionConfig, DEFAULT_INGESTION_PORT, DEFAULT_MAX_LINE_LENGTH, DEFAULT_MESSAGE_TIMEOUT,
};
pub use error::IngestionError;
pub use server::IngestionServer;

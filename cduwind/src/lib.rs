//! CDUWind - automated wind entry for a simulated avionics CDU
//!
//! This library receives weather briefings over a line-delimited JSON feed,
//! computes the five altitude-banded wind and temperature rows of the CDU
//! wind page, and types them in by driving a control-protocol peer through a
//! scripted, error-checked button sequence.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module ties the pieces together:
//!
//! ```ignore
//! use cduwind::control::{ControlLinkConfig, UdpControlLink};
//! use cduwind::ingestion::{IngestionConfig, IngestionServer, DEFAULT_INGESTION_PORT};
//! use cduwind::service::{WindEntryConfig, WindEntryService};
//!
//! let server = IngestionServer::new(IngestionConfig::default());
//! server.start(DEFAULT_INGESTION_PORT).await?;
//!
//! let link = Arc::new(UdpControlLink::bind(ControlLinkConfig::default()).await?);
//! let service = WindEntryService::new(link, WindEntryConfig::default());
//! ```

pub mod config;
pub mod control;
pub mod ingestion;
pub mod logging;
pub mod sequence;
pub mod service;
pub mod weather;
pub mod wind;

/// Version of the CDUWind library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

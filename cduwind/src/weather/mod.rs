//! Weather briefing data received from the ingestion feed.
//!
//! A [`WeatherSnapshot`] is decoded from one JSON line, validated, and handed
//! to subscribers. Snapshots are immutable and not retained by the server.

mod snapshot;

pub use snapshot::{MissionInfo, WeatherParseError, WeatherSnapshot, WindLayer};

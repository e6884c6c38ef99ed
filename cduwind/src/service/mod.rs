//! Wind entry orchestration.
//!
//! Ties the weather feed to the wind computation and the CDU sequence
//! engine.
//!
//! # Example
//!
//! ```ignore
//! let link = Arc::new(UdpControlLink::bind(ControlLinkConfig::default()).await?);
//! let service = Arc::new(WindEntryService::new(link, WindEntryConfig::default()));
//!
//! tokio::spawn({
//!     let service = Arc::clone(&service);
//!     async move { service.run_weather_loop(server.subscribe_weather(), shutdown).await }
//! });
//!
//! let outcome = service.enter_latest(None, &CancellationToken::new()).await?;
//! ```

mod error;
mod wind_entry;

pub use error::ServiceError;
pub use wind_entry::{ComputedWinds, WindEntryConfig, WindEntryService, DEFAULT_GROUND_TEMP_C};

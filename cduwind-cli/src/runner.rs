//! CLI runner for common setup and operations.
//!
//! Encapsulates configuration loading, logging initialization and the async
//! runtime so command handlers only deal with their own work.

use std::future::Future;
use std::sync::Arc;

use cduwind::config::ConfigFile;
use cduwind::control::UdpControlLink;
use cduwind::logging::{init_logging, LoggingGuard, LoggingOptions};
use cduwind::service::WindEntryConfig;
use cduwind::wind::MapId;
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, defaults to debug-level logging if `RUST_LOG` is unset
    /// * `stdout` - Mirror log output to the console
    pub fn new(debug_mode: bool, stdout: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(
            &config.logging.file,
            LoggingOptions {
                debug: debug_mode,
                stdout,
            },
        )
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("cduwind")
            .build()
            .map_err(CliError::Runtime)?;

        Ok(Self {
            logging_guard,
            config,
            runtime,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("CDUWind v{}", cduwind::VERSION);
        info!("CDUWind CLI: {} command", command);
    }

    /// Drive a future to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Service settings, with `map` overriding the configured map.
    pub fn wind_entry_config(&self, map: Option<MapId>) -> WindEntryConfig {
        WindEntryConfig {
            map: map.or(self.config.wind.map),
            timing: self.config.sequence.timing(),
        }
    }

    /// Open the UDP control link described by the configuration.
    pub async fn open_link(&self) -> Result<Arc<UdpControlLink>, CliError> {
        let link = UdpControlLink::bind(self.config.control.link_config()).await?;
        info!(
            peer = %link.peer_addr(),
            receive = %link.receive_addr(),
            "Control link open"
        );
        Ok(Arc::new(link))
    }
}

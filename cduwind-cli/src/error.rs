//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use cduwind::config::ConfigFileError;
use cduwind::control::ControlLinkError;
use cduwind::ingestion::IngestionError;
use cduwind::sequence::AbortReason;
use cduwind::service::ServiceError;
use cduwind::wind::WindMathError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Configuration file could not be read or written
    ConfigFile(ConfigFileError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Invalid wind inputs or map
    WindMath(WindMathError),
    /// Weather listener failed to start
    Ingestion(IngestionError),
    /// Control link could not be opened
    ControlLink(ControlLinkError),
    /// Wind entry failed
    Service(ServiceError),
    /// CDU entry stopped before the last command
    Aborted { step: usize, reason: AbortReason },
    /// CDU entry cancelled by the user
    Cancelled,
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Cancelled => 130,
            CliError::Aborted { .. } => 2,
            _ => 1,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Ingestion(IngestionError::Bind { port, .. }) => {
                eprintln!();
                eprintln!("Another process may already be listening on port {}.", port);
                eprintln!("Change it with: cduwind config set ingestion.port <port>");
            }
            CliError::ControlLink(ControlLinkError::ReceiveBind { addr, .. }) => {
                eprintln!();
                eprintln!("Could not listen for CDU reports on {}.", addr);
                eprintln!("Make sure no other CDU tool is running, or change");
                eprintln!("control.receive_port with 'cduwind config set'.");
            }
            CliError::Aborted { .. } => {
                eprintln!();
                eprintln!("The CDU may hold partially entered values.");
                eprintln!("Check the simulator is running and the control bridge is enabled.");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration error: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::WindMath(e) => write!(f, "Invalid wind input: {}", e),
            CliError::Ingestion(e) => write!(f, "Weather listener error: {}", e),
            CliError::ControlLink(e) => write!(f, "Control link error: {}", e),
            CliError::Service(e) => write!(f, "Wind entry failed: {}", e),
            CliError::Aborted { step, reason } => {
                write!(f, "CDU entry aborted at step {}: {}", step + 1, reason)
            }
            CliError::Cancelled => write!(f, "CDU entry cancelled"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::WindMath(e) => Some(e),
            CliError::Ingestion(e) => Some(e),
            CliError::ControlLink(e) => Some(e),
            CliError::Service(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<WindMathError> for CliError {
    fn from(e: WindMathError) -> Self {
        CliError::WindMath(e)
    }
}

impl From<IngestionError> for CliError {
    fn from(e: IngestionError) -> Self {
        CliError::Ingestion(e)
    }
}

impl From<ControlLinkError> for CliError {
    fn from(e: ControlLinkError) -> Self {
        CliError::ControlLink(e)
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        if e.is_cancelled() {
            CliError::Cancelled
        } else {
            CliError::Service(e)
        }
    }
}

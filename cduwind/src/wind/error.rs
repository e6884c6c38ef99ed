//! Error types for wind computation.

use thiserror::Error;

/// Errors produced by the wind computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindMathError {
    /// The map identifier is not one of the supported theatres.
    #[error("Unknown map identifier '{0}'")]
    UnknownMap(String),
}

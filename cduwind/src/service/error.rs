//! Service error types.

use std::fmt;

use crate::sequence::SequenceError;

/// Errors that can occur during wind entry operations.
#[derive(Debug)]
pub enum ServiceError {
    /// No map is configured and the mission theatre did not resolve to one
    MapUnresolved { theatre: Option<String> },
    /// No weather has been received yet
    NoWindData,
    /// Another CDU entry is in progress
    AlreadyRunning,
    /// Sequence generation or execution failed
    Sequence(SequenceError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapUnresolved { theatre: Some(t) } => {
                write!(f, "Theatre '{}' does not match a supported map", t)
            }
            Self::MapUnresolved { theatre: None } => {
                write!(f, "No map configured and the briefing names no theatre")
            }
            Self::NoWindData => write!(f, "No weather briefing received yet"),
            Self::AlreadyRunning => write!(f, "A CDU entry is already running"),
            Self::Sequence(e) => write!(f, "Sequence error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sequence(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SequenceError> for ServiceError {
    fn from(e: SequenceError) -> Self {
        Self::Sequence(e)
    }
}

impl ServiceError {
    /// Whether this is a cancelled CDU entry.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Sequence(SequenceError::Cancelled))
    }
}

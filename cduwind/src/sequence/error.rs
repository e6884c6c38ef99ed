//! Error types for sequence generation and execution.

use thiserror::Error;

/// Errors from building or executing a CDU entry sequence.
///
/// Peer validation errors and transport failures are not errors here: they
/// are reported through [`SequenceOutcome`](super::SequenceOutcome).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The run was cancelled. Held controls were released before returning.
    #[error("Sequence cancelled")]
    Cancelled,

    /// A row names an altitude band that has no field on the CDU.
    #[error("No CDU field for altitude band {0}")]
    UnsupportedBand(u8),
}

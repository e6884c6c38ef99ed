//! CDU button-sequence generation and execution.
//!
//! [`build_sequence`] turns five computed rows into the fixed entry
//! procedure; [`SequenceEngine`] plays it against a
//! [`ControlLink`](crate::control::ControlLink) with error detection,
//! one-shot clear-and-retry recovery and cancellation cleanup.

mod builder;
mod command;
mod engine;
mod error;
pub mod layout;
mod timing;

pub use builder::{build_sequence, SequenceBuilder};
pub use command::{render_listing, CommandKind, ControlCommand, ControlFamily};
pub use engine::{AbortReason, SequenceEngine, SequenceOutcome, SequenceProgress};
pub use error::SequenceError;
pub use timing::SequenceTiming;

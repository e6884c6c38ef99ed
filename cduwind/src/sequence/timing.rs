//! Delays used when generating and executing sequences.

use std::time::Duration;

/// Post-command delays and settle times for a sequence run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTiming {
    /// After pressing a key.
    pub press: Duration,
    /// After releasing a digit key.
    pub release: Duration,
    /// After releasing a line-select or function key.
    pub line_select: Duration,
    /// How long the page switch is held off center.
    pub page_hold: Duration,
    /// After the page switch returns to center.
    pub page_settle: Duration,
    /// Before reading the status line for an error.
    pub error_settle: Duration,
}

impl SequenceTiming {
    /// No delays at all. Useful for listings and tests.
    pub const fn immediate() -> Self {
        Self {
            press: Duration::ZERO,
            release: Duration::ZERO,
            line_select: Duration::ZERO,
            page_hold: Duration::ZERO,
            page_settle: Duration::ZERO,
            error_settle: Duration::ZERO,
        }
    }
}

impl Default for SequenceTiming {
    fn default() -> Self {
        Self {
            press: Duration::from_millis(80),
            release: Duration::from_millis(80),
            line_select: Duration::from_millis(250),
            page_hold: Duration::from_millis(200),
            page_settle: Duration::from_millis(300),
            error_settle: Duration::from_millis(150),
        }
    }
}

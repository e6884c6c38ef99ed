//! The control link abstraction the sequence engine drives.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Status (scratchpad) line the peer reports validation errors on.
pub const STATUS_CONTROL: &str = "CDU_LINE9";

/// Key that clears a validation error.
pub const CLEAR_CONTROL: &str = "CDU_CLR";

/// Value that returns a tristate switch to its rest position.
pub const SWITCH_CENTER: i32 = 1;

/// Pause between pressing and releasing the clear key.
pub const CLEAR_SETTLE: Duration = Duration::from_millis(100);

/// Returns true when a status-line value reports a validation error.
///
/// Matching is case-insensitive on the substrings "error" and "invalid".
pub fn is_error_status(status: &str) -> bool {
    let lower = status.to_lowercase();
    lower.contains("error") || lower.contains("invalid")
}

/// A bidirectional connection to the control-protocol peer.
///
/// Implementations send "set control to value" commands and keep a snapshot
/// of the last value the peer reported for each control. The error-handling
/// helpers have default implementations built on those two primitives.
pub trait ControlLink: Send + Sync {
    /// Send one command. Returns false when the local transport failed.
    fn send_control(&self, name: &str, value: i32) -> impl Future<Output = bool> + Send;

    /// Last reported value of a control, if any.
    fn value(&self, name: &str) -> Option<String>;

    /// Copy of every control value reported so far.
    fn snapshot(&self) -> HashMap<String, String>;

    /// Whether the status line currently reports an error.
    ///
    /// False when no status has ever been received.
    fn has_error_condition(&self) -> bool {
        self.value(STATUS_CONTROL)
            .is_some_and(|status| is_error_status(&status))
    }

    /// Press and release the clear key.
    fn clear_error(&self) -> impl Future<Output = bool> + Send {
        async move {
            if !self.send_control(CLEAR_CONTROL, 1).await {
                return false;
            }
            tokio::time::sleep(CLEAR_SETTLE).await;
            self.send_control(CLEAR_CONTROL, 0).await
        }
    }

    /// Move a tristate switch to `position`, hold it, then recenter it.
    fn set_tristate_switch(
        &self,
        control: &str,
        position: i32,
        hold: Duration,
    ) -> impl Future<Output = bool> + Send {
        async move {
            if !self.send_control(control, position).await {
                return false;
            }
            tokio::time::sleep(hold).await;
            self.send_control(control, SWITCH_CENTER).await
        }
    }
}

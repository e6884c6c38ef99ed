//! Serial execution of a command list against a [`ControlLink`].
//!
//! Each command is sent in order. Commands that can trip a peer validation
//! error are followed by a status check; a detected error is cleared and the
//! command re-issued once. Whatever the retry shows, the run moves on.
//!
//! Cancellation is honored by every send and delay. Before the cancellation
//! reaches the caller, a key left pressed is released and a page switch left
//! off center is recentered.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::command::{CommandKind, ControlCommand};
use super::error::SequenceError;
use super::timing::SequenceTiming;
use crate::control::{ControlLink, CLEAR_CONTROL, STATUS_CONTROL, SWITCH_CENTER};

/// Progress notification sent before each command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceProgress {
    /// Zero-based command index.
    pub step: usize,
    pub total: usize,
    pub description: String,
}

impl fmt::Display for SequenceProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.step + 1, self.total, self.description)
    }
}

/// Why a run stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The local transport failed to send a command.
    Transport { control: String },
    /// A peer error was detected and the clear key could not be sent.
    ClearFailed,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Transport { control } => write!(f, "failed to send {}", control),
            AbortReason::ClearFailed => write!(f, "failed to clear a CDU input error"),
        }
    }
}

/// How a run that was not cancelled ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// Every command was executed. `unresolved_errors` counts commands whose
    /// peer error was still present after the retry.
    Completed { unresolved_errors: usize },
    /// The run stopped at command index `step`.
    Aborted { step: usize, reason: AbortReason },
}

impl SequenceOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SequenceOutcome::Completed { .. })
    }
}

/// Result of the error check after a command.
enum Recovery {
    Clean,
    Unresolved,
    Abort(AbortReason),
}

/// Controls that must be returned to rest if the run is cancelled.
#[derive(Debug, Default)]
struct HeldControls {
    pressed: Option<String>,
    /// Clear key mid-press. Tracked apart from `pressed`, which may still
    /// hold the key whose entry raised the error.
    clearing: Option<String>,
    switch: Option<String>,
}

/// Executes CDU command sequences over a control link.
pub struct SequenceEngine<L> {
    link: Arc<L>,
    timing: SequenceTiming,
}

impl<L: ControlLink> SequenceEngine<L> {
    pub fn new(link: Arc<L>, timing: SequenceTiming) -> Self {
        Self { link, timing }
    }

    pub fn link(&self) -> &Arc<L> {
        &self.link
    }

    pub fn timing(&self) -> &SequenceTiming {
        &self.timing
    }

    /// Run `commands` in order.
    ///
    /// Progress is delivered with `try_send`, so a full or closed channel
    /// drops notifications instead of stalling the run. Returns
    /// [`SequenceError::Cancelled`] after cleanup when `cancel` fires.
    pub async fn execute(
        &self,
        commands: &[ControlCommand],
        progress: Option<&mpsc::Sender<SequenceProgress>>,
        cancel: &CancellationToken,
    ) -> Result<SequenceOutcome, SequenceError> {
        info!(commands = commands.len(), "Starting CDU sequence");

        let mut held = HeldControls::default();
        let result = self.run(commands, progress, cancel, &mut held).await;

        match &result {
            Ok(SequenceOutcome::Completed { unresolved_errors }) => {
                info!(unresolved_errors, "CDU sequence completed");
            }
            Ok(SequenceOutcome::Aborted { step, reason }) => {
                warn!(step, reason = %reason, "CDU sequence aborted");
            }
            Err(SequenceError::Cancelled) => {
                self.release_held(&mut held).await;
                info!("CDU sequence cancelled");
            }
            Err(e) => warn!(error = %e, "CDU sequence failed"),
        }

        result
    }

    async fn run(
        &self,
        commands: &[ControlCommand],
        progress: Option<&mpsc::Sender<SequenceProgress>>,
        cancel: &CancellationToken,
        held: &mut HeldControls,
    ) -> Result<SequenceOutcome, SequenceError> {
        let total = commands.len();
        let mut unresolved_errors = 0;
        // Switch whose recentering was already done by the previous command
        let mut recentered: Option<&str> = None;

        for (step, command) in commands.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(SequenceError::Cancelled);
            }
            report(progress, step, total, command);

            let previous_switch = recentered.take();
            if command.kind == CommandKind::SwitchCenter
                && previous_switch == Some(command.name.as_str())
            {
                trace!(step, control = %command.name, "Switch already centered");
                self.pause(command.delay, cancel).await?;
                continue;
            }

            if !self.issue(command, cancel, held).await? {
                return Ok(transport_abort(step, command));
            }

            if command.family.needs_error_check() {
                match self.check_and_recover(step, command, cancel, held).await? {
                    Recovery::Clean => {}
                    Recovery::Unresolved => unresolved_errors += 1,
                    Recovery::Abort(reason) => return Ok(SequenceOutcome::Aborted { step, reason }),
                }
            }

            if command.kind == CommandKind::SwitchSet {
                recentered = Some(command.name.as_str());
            }
        }

        Ok(SequenceOutcome::Completed { unresolved_errors })
    }

    /// Send one command with the bookkeeping its kind needs, then wait its
    /// post-delay. Returns false on transport failure.
    async fn issue(
        &self,
        command: &ControlCommand,
        cancel: &CancellationToken,
        held: &mut HeldControls,
    ) -> Result<bool, SequenceError> {
        let sent = match command.kind {
            CommandKind::Press => {
                held.pressed = Some(command.name.clone());
                self.send(&command.name, command.value, cancel).await?
            }
            CommandKind::Release => {
                let sent = self.send(&command.name, command.value, cancel).await?;
                if sent {
                    held.pressed = None;
                }
                sent
            }
            CommandKind::SwitchSet => {
                held.switch = Some(command.name.clone());
                let done = self
                    .guard(
                        self.link
                            .set_tristate_switch(&command.name, command.value, command.delay),
                        cancel,
                    )
                    .await?;
                if done {
                    held.switch = None;
                }
                // The hold already used this command's delay
                return Ok(done);
            }
            CommandKind::SwitchCenter => {
                let sent = self.send(&command.name, command.value, cancel).await?;
                if sent {
                    held.switch = None;
                }
                sent
            }
        };

        if sent {
            self.pause(command.delay, cancel).await?;
        }
        Ok(sent)
    }

    async fn check_and_recover(
        &self,
        step: usize,
        command: &ControlCommand,
        cancel: &CancellationToken,
        held: &mut HeldControls,
    ) -> Result<Recovery, SequenceError> {
        self.pause(self.timing.error_settle, cancel).await?;
        if !self.link.has_error_condition() {
            return Ok(Recovery::Clean);
        }

        warn!(
            step,
            control = %command.name,
            status = ?self.link.value(STATUS_CONTROL),
            "CDU reported input error, clearing"
        );

        held.clearing = Some(CLEAR_CONTROL.to_string());
        if !self.guard(self.link.clear_error(), cancel).await? {
            return Ok(Recovery::Abort(AbortReason::ClearFailed));
        }
        held.clearing = None;

        self.pause(self.timing.error_settle, cancel).await?;
        debug!(step, control = %command.name, "Retrying command");
        if !self.issue(command, cancel, held).await? {
            return Ok(Recovery::Abort(AbortReason::Transport {
                control: command.name.clone(),
            }));
        }

        self.pause(self.timing.error_settle, cancel).await?;
        if self.link.has_error_condition() {
            warn!(
                step,
                control = %command.name,
                status = ?self.link.value(STATUS_CONTROL),
                "CDU input error persisted after retry, continuing"
            );
            Ok(Recovery::Unresolved)
        } else {
            debug!(step, control = %command.name, "CDU input error resolved by retry");
            Ok(Recovery::Clean)
        }
    }

    async fn send(
        &self,
        name: &str,
        value: i32,
        cancel: &CancellationToken,
    ) -> Result<bool, SequenceError> {
        self.guard(self.link.send_control(name, value), cancel).await
    }

    async fn pause(&self, duration: Duration, cancel: &CancellationToken) -> Result<(), SequenceError> {
        self.guard(tokio::time::sleep(duration), cancel).await
    }

    /// Run `fut` unless `cancel` fires first.
    async fn guard<F: Future>(
        &self,
        fut: F,
        cancel: &CancellationToken,
    ) -> Result<F::Output, SequenceError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SequenceError::Cancelled),
            output = fut => Ok(output),
        }
    }

    async fn release_held(&self, held: &mut HeldControls) {
        for name in [held.clearing.take(), held.pressed.take()].into_iter().flatten() {
            info!(control = %name, "Releasing key after cancellation");
            if !self.link.send_control(&name, 0).await {
                warn!(control = %name, "Failed to release key after cancellation");
            }
        }
        if let Some(name) = held.switch.take() {
            info!(control = %name, "Recentering switch after cancellation");
            if !self.link.send_control(&name, SWITCH_CENTER).await {
                warn!(control = %name, "Failed to recenter switch after cancellation");
            }
        }
    }
}

fn transport_abort(step: usize, command: &ControlCommand) -> SequenceOutcome {
    SequenceOutcome::Aborted {
        step,
        reason: AbortReason::Transport {
            control: command.name.clone(),
        },
    }
}

fn report(
    progress: Option<&mpsc::Sender<SequenceProgress>>,
    step: usize,
    total: usize,
    command: &ControlCommand,
) {
    let description = command.describe();
    debug!(step, total, command = %description, "Executing command");

    if let Some(tx) = progress {
        let _ = tx.try_send(SequenceProgress {
            step,
            total,
            description,
        });
    }
}

//! Control commands produced by the sequence builder.

use std::fmt;
use std::time::Duration;

use super::layout::{PAGE_NEXT, PAGE_PREVIOUS};

/// How the engine dispatches a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Key down (value 1).
    Press,
    /// Key up (value 0).
    Release,
    /// Move a tristate switch off center; the delay is the hold time.
    SwitchSet,
    /// Return a tristate switch to center.
    SwitchCenter,
}

/// Which group of controls a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFamily {
    /// Keypad digits.
    Digit,
    /// Line-select keys beside the display.
    LineSelect,
    /// The page switch.
    PageSwitch,
    /// Other function keys.
    Function,
}

impl ControlFamily {
    /// Whether the peer may reject input after a command of this family.
    pub fn needs_error_check(&self) -> bool {
        !matches!(self, ControlFamily::Function)
    }
}

/// One step of a CDU entry sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlCommand {
    pub name: String,
    pub value: i32,
    /// Wait after the command (hold time for [`CommandKind::SwitchSet`]).
    pub delay: Duration,
    pub kind: CommandKind,
    pub family: ControlFamily,
}

impl ControlCommand {
    pub fn press(name: impl Into<String>, family: ControlFamily, delay: Duration) -> Self {
        Self {
            name: name.into(),
            value: 1,
            delay,
            kind: CommandKind::Press,
            family,
        }
    }

    pub fn release(name: impl Into<String>, family: ControlFamily, delay: Duration) -> Self {
        Self {
            name: name.into(),
            value: 0,
            delay,
            kind: CommandKind::Release,
            family,
        }
    }

    pub fn switch_set(name: impl Into<String>, position: i32, hold: Duration) -> Self {
        Self {
            name: name.into(),
            value: position,
            delay: hold,
            kind: CommandKind::SwitchSet,
            family: ControlFamily::PageSwitch,
        }
    }

    pub fn switch_center(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            value: crate::control::SWITCH_CENTER,
            delay,
            kind: CommandKind::SwitchCenter,
            family: ControlFamily::PageSwitch,
        }
    }

    /// Human-readable description used for progress and listings.
    pub fn describe(&self) -> String {
        match self.kind {
            CommandKind::Press => format!("Press {}", self.name),
            CommandKind::Release => format!("Release {}", self.name),
            CommandKind::SwitchSet => {
                let direction = match self.value {
                    PAGE_NEXT => "next page",
                    PAGE_PREVIOUS => "previous page",
                    _ => "position",
                };
                format!("Set {} to {} ({})", self.name, self.value, direction)
            }
            CommandKind::SwitchCenter => format!("Center {}", self.name),
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<28} {:>5}ms", self.describe(), self.delay.as_millis())
    }
}

/// Render a command list one line per command, numbered from 1.
pub fn render_listing(commands: &[ControlCommand]) -> String {
    commands
        .iter()
        .enumerate()
        .map(|(i, cmd)| format!("{:>4}  {}\n", i + 1, cmd))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_keys_skip_error_check() {
        assert!(ControlFamily::Digit.needs_error_check());
        assert!(ControlFamily::LineSelect.needs_error_check());
        assert!(ControlFamily::PageSwitch.needs_error_check());
        assert!(!ControlFamily::Function.needs_error_check());
    }

    #[test]
    fn test_describe() {
        let press = ControlCommand::press("CDU_7", ControlFamily::Digit, Duration::ZERO);
        assert_eq!(press.value, 1);
        assert_eq!(press.describe(), "Press CDU_7");

        let set = ControlCommand::switch_set("CDU_PG", PAGE_NEXT, Duration::ZERO);
        assert_eq!(set.describe(), "Set CDU_PG to 2 (next page)");

        let center = ControlCommand::switch_center("CDU_PG", Duration::ZERO);
        assert_eq!(center.value, 1);
        assert_eq!(center.describe(), "Center CDU_PG");
    }

    #[test]
    fn test_listing_numbers_lines() {
        let commands = vec![
            ControlCommand::press("CDU_SYS", ControlFamily::Function, Duration::from_millis(80)),
            ControlCommand::release("CDU_SYS", ControlFamily::Function, Duration::from_millis(250)),
        ];
        let listing = render_listing(&commands);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].trim_start().starts_with("1  Press CDU_SYS"));
        assert!(lines[1].ends_with("250ms"));
    }
}

//! Generation of the CDU wind entry procedure.
//!
//! Three phases append to one command list: navigation to the wind page,
//! wind fields, then temperature fields. The builder tracks the current page
//! and inserts a page turn whenever the next field lives elsewhere.

use super::command::{ControlCommand, ControlFamily};
use super::error::SequenceError;
use super::layout::{
    digit_key, field_position, FieldPosition, LASTE_SELECT, PAGE_NEXT, PAGE_PREVIOUS,
    PAGE_SWITCH, SYSTEM_KEY, WIND_SELECT,
};
use super::timing::SequenceTiming;
use crate::wind::CduRow;

/// Page shown right after navigating to the wind page.
const FIRST_PAGE: u8 = 1;

/// Accumulates commands for one sequence.
#[derive(Debug)]
pub struct SequenceBuilder {
    timing: SequenceTiming,
    commands: Vec<ControlCommand>,
    page: u8,
}

impl SequenceBuilder {
    pub fn new(timing: SequenceTiming) -> Self {
        Self {
            timing,
            commands: Vec::new(),
            page: FIRST_PAGE,
        }
    }

    /// SYS, then LASTE, then WIND. Leaves the CDU on the first wind page.
    pub fn navigation(&mut self) -> &mut Self {
        self.key(SYSTEM_KEY, ControlFamily::Function);
        self.key(LASTE_SELECT, ControlFamily::LineSelect);
        self.key(WIND_SELECT, ControlFamily::LineSelect);
        self.page = FIRST_PAGE;
        self
    }

    /// Type `BBBSS` for each row and commit it with the left key.
    pub fn wind_entries(&mut self, rows: &[CduRow]) -> Result<&mut Self, SequenceError> {
        for row in rows {
            let position = self.position_for(row)?;
            self.turn_to(position.page);
            self.digits(&row.wind_digits());
            self.key(&position.wind_key(), ControlFamily::LineSelect);
        }
        Ok(self)
    }

    /// Type |temperature| for each row and commit it with the right key,
    /// twice when the temperature is negative.
    pub fn temperature_entries(&mut self, rows: &[CduRow]) -> Result<&mut Self, SequenceError> {
        for row in rows {
            let position = self.position_for(row)?;
            self.turn_to(position.page);
            self.digits(&row.temperature_digits());

            let key = position.temperature_key();
            self.key(&key, ControlFamily::LineSelect);
            if row.is_negative_temperature() {
                self.key(&key, ControlFamily::LineSelect);
            }
        }
        Ok(self)
    }

    pub fn build(self) -> Vec<ControlCommand> {
        self.commands
    }

    fn position_for(&self, row: &CduRow) -> Result<FieldPosition, SequenceError> {
        field_position(row.band).ok_or(SequenceError::UnsupportedBand(row.band))
    }

    fn key(&mut self, name: &str, family: ControlFamily) {
        let release_delay = match family {
            ControlFamily::Digit => self.timing.release,
            _ => self.timing.line_select,
        };
        self.commands
            .push(ControlCommand::press(name, family, self.timing.press));
        self.commands.push(ControlCommand::release(name, family, release_delay));
    }

    fn digits(&mut self, digits: &str) {
        for key in digits.chars().filter_map(digit_key) {
            self.key(key, ControlFamily::Digit);
        }
    }

    fn turn_to(&mut self, page: u8) {
        while self.page != page {
            let position = if page > self.page {
                self.page += 1;
                PAGE_NEXT
            } else {
                self.page -= 1;
                PAGE_PREVIOUS
            };
            self.commands.push(ControlCommand::switch_set(
                PAGE_SWITCH,
                position,
                self.timing.page_hold,
            ));
            self.commands.push(ControlCommand::switch_center(
                PAGE_SWITCH,
                self.timing.page_settle,
            ));
        }
    }
}

/// Build the full wind entry procedure for five computed rows.
pub fn build_sequence(
    rows: &[CduRow],
    timing: SequenceTiming,
) -> Result<Vec<ControlCommand>, SequenceError> {
    let mut builder = SequenceBuilder::new(timing);
    builder
        .navigation()
        .wind_entries(rows)?
        .temperature_entries(rows)?;
    Ok(builder.build())
}

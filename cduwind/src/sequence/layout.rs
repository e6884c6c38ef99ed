//! Control names and field positions on the CDU.
//!
//! The wind page spans two pages. Page 1 holds bands 0, 1, 2 and 7 on
//! line-select rows 3, 5, 7 and 9; page 2 holds band 26 on row 3. Wind fields
//! sit on the left keys, temperature fields on the right keys.

/// System key, opens the system menu.
pub const SYSTEM_KEY: &str = "CDU_SYS";

/// Line-select key for the LASTE page in the system menu.
pub const LASTE_SELECT: &str = "CDU_LSK_7R";

/// Line-select key for the WIND page in the LASTE menu.
pub const WIND_SELECT: &str = "CDU_LSK_3R";

/// Three-position page switch.
pub const PAGE_SWITCH: &str = "CDU_PG";

/// Page switch position for the previous page.
pub const PAGE_PREVIOUS: i32 = 0;

/// Page switch position for the next page.
pub const PAGE_NEXT: i32 = 2;

/// Digit keys indexed by digit value.
pub const DIGIT_KEYS: [&str; 10] = [
    "CDU_0", "CDU_1", "CDU_2", "CDU_3", "CDU_4", "CDU_5", "CDU_6", "CDU_7", "CDU_8", "CDU_9",
];

/// Where the fields for one altitude band live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPosition {
    /// Wind page number, starting at 1.
    pub page: u8,
    /// Line-select row (3, 5, 7 or 9).
    pub row: u8,
}

impl FieldPosition {
    /// Left line-select key committing the wind field.
    pub fn wind_key(&self) -> String {
        format!("CDU_LSK_{}L", self.row)
    }

    /// Right line-select key committing the temperature field.
    pub fn temperature_key(&self) -> String {
        format!("CDU_LSK_{}R", self.row)
    }
}

/// Field position for an altitude band, `None` for bands the page lacks.
pub fn field_position(band: u8) -> Option<FieldPosition> {
    let (page, row) = match band {
        0 => (1, 3),
        1 => (1, 5),
        2 => (1, 7),
        7 => (1, 9),
        26 => (2, 3),
        _ => return None,
    };
    Some(FieldPosition { page, row })
}

/// Digit key for an ASCII digit.
pub fn digit_key(digit: char) -> Option<&'static str> {
    digit.to_digit(10).map(|d| DIGIT_KEYS[d as usize])
}

//! Altitude-banded wind and temperature computation.
//!
//! Converts three briefing wind layers and a ground temperature into the five
//! rows entered on the CDU wind page. The formula is fixed:
//!
//! - bearing = round(direction - variation), wrapped into [0, 359]
//! - speed   = round(speed_mps * 1.94 * factor), factor 2.0 for bands 1 and 2
//! - temp    = round(ground_temp - 2.0 * band)
//!
//! All rounding is half away from zero (`f64::round`).

use std::fmt;

use super::error::WindMathError;
use super::maps::MapId;
use crate::weather::WindLayer;

/// Metres per second to knots, as used by the briefing methodology.
const MPS_TO_KNOTS: f64 = 1.94;

/// Temperature lapse in °C per band unit (thousand feet).
const LAPSE_PER_BAND: f64 = 2.0;

/// Altitude bands in thousands of feet, in CDU entry order.
pub const ALTITUDE_BANDS: [u8; 5] = [0, 1, 2, 7, 26];

/// One computed CDU wind page entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CduRow {
    /// Altitude band in thousands of feet.
    pub band: u8,
    /// Magnetic bearing the wind blows from, 0..=359.
    pub bearing: u16,
    /// Wind speed in knots. May exceed 99.
    pub speed: u32,
    /// Temperature in °C. May be negative.
    pub temperature: i32,
}

impl CduRow {
    /// Digits typed for the wind field: bearing padded to three digits
    /// followed by speed padded to at least two (`27019`, `263120`).
    pub fn wind_digits(&self) -> String {
        format!("{:03}{:02}", self.bearing, self.speed)
    }

    /// Digits typed for the temperature field (magnitude only).
    pub fn temperature_digits(&self) -> String {
        self.temperature.unsigned_abs().to_string()
    }

    /// Whether the temperature field must be committed as negative.
    pub fn is_negative_temperature(&self) -> bool {
        self.temperature < 0
    }
}

impl fmt::Display for CduRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}  {:03}/{:02}  {:+}",
            self.band, self.bearing, self.speed, self.temperature
        )
    }
}

/// Five rows, one per entry of [`ALTITUDE_BANDS`], in band order.
pub type CduRows = [CduRow; 5];

/// Compute CDU rows for a canonical map identifier.
///
/// Returns [`WindMathError::UnknownMap`] when `map_id` is not one of the ten
/// supported identifiers.
pub fn compute(
    ground: &WindLayer,
    mid: &WindLayer,
    high: &WindLayer,
    ground_temp_c: i32,
    map_id: &str,
) -> Result<CduRows, WindMathError> {
    let map: MapId = map_id.parse()?;
    Ok(compute_for_map(ground, mid, high, ground_temp_c, map))
}

/// Compute CDU rows for an already-resolved map.
pub fn compute_for_map(
    ground: &WindLayer,
    mid: &WindLayer,
    high: &WindLayer,
    ground_temp_c: i32,
    map: MapId,
) -> CduRows {
    let variation = map.magnetic_variation();

    ALTITUDE_BANDS.map(|band| {
        let layer = match band {
            0..=2 => ground,
            7 => mid,
            _ => high,
        };
        let factor = if matches!(band, 1 | 2) { 2.0 } else { 1.0 };

        CduRow {
            band,
            bearing: magnetic_bearing(layer.direction, variation),
            speed: (layer.speed * MPS_TO_KNOTS * factor).round().max(0.0) as u32,
            temperature: (f64::from(ground_temp_c) - LAPSE_PER_BAND * f64::from(band)).round()
                as i32,
        }
    })
}

/// Round `direction - variation` and wrap into [0, 359].
fn magnetic_bearing(direction: f64, variation: f64) -> u16 {
    let raw = (direction - variation).round() as i64;
    raw.rem_euclid(360) as u16
}

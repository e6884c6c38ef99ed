//! Weather snapshot model and JSON line decoding.
//!
//! Wire shape (camelCase keys):
//!
//! ```text
//! { "ground": Wind, "at2000m": Wind, "at8000m": Wind,
//!   "groundTemp": int?, "timestamp": int64, "source": string,
//!   "mission": { "theatre": string?, "sortie": string?, "start_time": int? }? }
//!
//! Wind = { "speed": float, "direction": float, "navDirection": float? }
//! ```

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Errors decoding a weather line.
#[derive(Debug, Error)]
pub enum WeatherParseError {
    /// The line is not a JSON object of the expected shape.
    #[error("Malformed weather JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A wind layer carries values outside the accepted range.
    #[error("Invalid {layer} wind layer: {reason}")]
    InvalidLayer { layer: &'static str, reason: String },
}

/// A single wind layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindLayer {
    /// Speed in metres per second.
    pub speed: f64,
    /// Direction the wind blows from, in degrees. Normalized to [0, 360)
    /// once the snapshot has been validated.
    pub direction: f64,
    /// Direction the wind blows toward, if the sender provides it.
    #[serde(default)]
    pub nav_direction: Option<f64>,
}

impl WindLayer {
    fn validate(&mut self, layer: &'static str) -> Result<(), WeatherParseError> {
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(WeatherParseError::InvalidLayer {
                layer,
                reason: format!("speed must be a non-negative number, got {}", self.speed),
            });
        }
        if !self.direction.is_finite() {
            return Err(WeatherParseError::InvalidLayer {
                layer,
                reason: "direction must be a finite number".to_string(),
            });
        }
        self.direction = self.direction.rem_euclid(360.0);
        Ok(())
    }
}

/// Mission metadata attached to a briefing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MissionInfo {
    #[serde(default)]
    pub theatre: Option<String>,
    #[serde(default)]
    pub sortie: Option<String>,
    /// Mission start offset in seconds.
    #[serde(default)]
    pub start_time: Option<i64>,
}

/// One decoded weather message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub ground: WindLayer,
    #[serde(rename = "at2000m")]
    pub mid: WindLayer,
    #[serde(rename = "at8000m")]
    pub high: WindLayer,
    /// Ground temperature in whole °C.
    #[serde(default, deserialize_with = "whole_degrees")]
    pub ground_temp: Option<i32>,
    /// Unix timestamp (seconds).
    pub timestamp: i64,
    /// Free-form tag naming the sender.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub mission: Option<MissionInfo>,
}

impl WeatherSnapshot {
    /// Decode and validate one JSON line.
    pub fn from_json_line(line: &str) -> Result<Self, WeatherParseError> {
        let mut snapshot: WeatherSnapshot = serde_json::from_str(line)?;
        snapshot.ground.validate("ground")?;
        snapshot.mid.validate("at2000m")?;
        snapshot.high.validate("at8000m")?;
        Ok(snapshot)
    }

    /// Theatre name from the mission metadata, if any.
    pub fn theatre(&self) -> Option<&str> {
        self.mission.as_ref()?.theatre.as_deref()
    }
}

/// Accept integral or fractional JSON numbers, rounding the latter.
fn whole_degrees<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()).map(|v| v.round() as i32))
}

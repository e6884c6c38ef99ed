//! Common types and utilities shared across CLI commands.

use clap::Args;
use cduwind::service::DEFAULT_GROUND_TEMP_C;
use cduwind::weather::WindLayer;
use cduwind::wind::{compute_for_map, map_theatre_to_map_id, CduRows, MapId, WindMathError};

use crate::error::CliError;

/// Briefing inputs for a one-off computation.
#[derive(Debug, Clone, Args)]
pub struct WindArgs {
    /// Ground wind speed in m/s
    #[arg(long)]
    pub ground_speed: f64,

    /// Ground wind direction in degrees (blowing from)
    #[arg(long)]
    pub ground_dir: f64,

    /// Wind speed at 2000 m in m/s
    #[arg(long)]
    pub mid_speed: f64,

    /// Wind direction at 2000 m in degrees
    #[arg(long)]
    pub mid_dir: f64,

    /// Wind speed at 8000 m in m/s
    #[arg(long)]
    pub high_speed: f64,

    /// Wind direction at 8000 m in degrees
    #[arg(long)]
    pub high_dir: f64,

    /// Ground temperature in °C (default: 15)
    #[arg(long, allow_hyphen_values = true)]
    pub temp: Option<i32>,

    /// Map identifier or theatre name (e.g., Caucasus, "Persian Gulf")
    #[arg(long)]
    pub map: String,
}

impl WindArgs {
    /// Validate the inputs and compute the five CDU rows.
    pub fn compute(&self) -> Result<(MapId, CduRows), CliError> {
        let map = parse_map(&self.map)?;
        let [ground, mid, high] = [
            ("ground", self.ground_speed, self.ground_dir),
            ("2000 m", self.mid_speed, self.mid_dir),
            ("8000 m", self.high_speed, self.high_dir),
        ]
        .map(|(name, speed, direction)| layer(name, speed, direction));

        let rows = compute_for_map(&ground?, &mid?, &high?, self.ground_temp(), map);
        Ok((map, rows))
    }

    pub fn ground_temp(&self) -> i32 {
        self.temp.unwrap_or(DEFAULT_GROUND_TEMP_C)
    }
}

fn layer(name: &str, speed: f64, direction: f64) -> Result<WindLayer, CliError> {
    if !speed.is_finite() || speed < 0.0 {
        return Err(CliError::Config(format!(
            "{} wind speed must be a non-negative number, got {}",
            name, speed
        )));
    }
    if !direction.is_finite() {
        return Err(CliError::Config(format!(
            "{} wind direction must be a number, got {}",
            name, direction
        )));
    }

    Ok(WindLayer {
        speed,
        direction: direction.rem_euclid(360.0),
        nav_direction: None,
    })
}

/// Parse a map from a canonical identifier or a theatre name.
pub fn parse_map(value: &str) -> Result<MapId, CliError> {
    value
        .parse::<MapId>()
        .ok()
        .or_else(|| map_theatre_to_map_id(value))
        .ok_or_else(|| CliError::WindMath(WindMathError::UnknownMap(value.to_string())))
}

/// Print the computed rows as a table.
pub fn print_table(map: MapId, ground_temp: i32, rows: &CduRows) {
    println!(
        "Map: {} (variation {:+.1}°)   Ground temp: {}°C",
        map,
        map.magnetic_variation(),
        ground_temp
    );
    println!();
    println!("ALT   WIND     TEMP");
    for row in rows {
        println!("{}", row);
    }
}

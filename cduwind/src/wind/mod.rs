//! Wind and temperature computation for the CDU wind page.
//!
//! Pure functions only: [`compute`] maps the three briefing wind layers, a
//! ground temperature and a map identifier to the five [`CduRow`] entries,
//! and [`map_theatre_to_map_id`] resolves mission theatre names to one of the
//! supported [`MapId`]s.

mod compute;
mod error;
mod maps;

pub use compute::{compute, compute_for_map, CduRow, CduRows, ALTITUDE_BANDS};
pub use error::WindMathError;
pub use maps::{magnetic_variation, map_theatre_to_map_id, MapId};

//! Supported theatre maps and their magnetic variation.
//!
//! Each map carries a single static variation (degrees, east positive) that is
//! subtracted from a true bearing to obtain the magnetic bearing the CDU
//! expects. Free-form theatre names reported by mission metadata are resolved
//! with [`map_theatre_to_map_id`].

use std::fmt;
use std::str::FromStr;

use super::error::WindMathError;

/// One of the ten supported theatre maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapId {
    Caucasus,
    PersianGulf,
    Nevada,
    Normandy,
    TheChannel,
    Syria,
    MarianaIslands,
    SinaiMap,
    Falklands,
    Kola,
}

impl MapId {
    /// All supported maps, in table order.
    pub const ALL: [MapId; 10] = [
        MapId::Caucasus,
        MapId::PersianGulf,
        MapId::Nevada,
        MapId::Normandy,
        MapId::TheChannel,
        MapId::Syria,
        MapId::MarianaIslands,
        MapId::SinaiMap,
        MapId::Falklands,
        MapId::Kola,
    ];

    /// Canonical identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapId::Caucasus => "Caucasus",
            MapId::PersianGulf => "PersianGulf",
            MapId::Nevada => "Nevada",
            MapId::Normandy => "Normandy",
            MapId::TheChannel => "TheChannel",
            MapId::Syria => "Syria",
            MapId::MarianaIslands => "MarianaIslands",
            MapId::SinaiMap => "SinaiMap",
            MapId::Falklands => "Falklands",
            MapId::Kola => "Kola",
        }
    }

    /// Magnetic variation in degrees (east positive).
    pub fn magnetic_variation(&self) -> f64 {
        match self {
            MapId::Caucasus => 7.3,
            MapId::PersianGulf => 2.0,
            MapId::Nevada => 11.5,
            MapId::Normandy => 0.5,
            MapId::TheChannel => 0.5,
            MapId::Syria => 5.0,
            MapId::MarianaIslands => -0.5,
            MapId::SinaiMap => 4.5,
            MapId::Falklands => -1.5,
            MapId::Kola => 15.0,
        }
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapId {
    type Err = WindMathError;

    /// Parses a canonical identifier. Matching is exact; use
    /// [`map_theatre_to_map_id`] for free-form theatre names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| WindMathError::UnknownMap(s.to_string()))
    }
}

/// Look up the magnetic variation for a canonical map identifier.
pub fn magnetic_variation(map_id: &str) -> Result<f64, WindMathError> {
    map_id.parse::<MapId>().map(|id| id.magnetic_variation())
}

/// Exact theatre names, including the aliases mission files commonly use.
const THEATRE_TABLE: &[(&str, MapId)] = &[
    ("Caucasus", MapId::Caucasus),
    ("PersianGulf", MapId::PersianGulf),
    ("Persian Gulf", MapId::PersianGulf),
    ("Nevada", MapId::Nevada),
    ("NTTR", MapId::Nevada),
    ("Normandy", MapId::Normandy),
    ("TheChannel", MapId::TheChannel),
    ("The Channel", MapId::TheChannel),
    ("Channel", MapId::TheChannel),
    ("Syria", MapId::Syria),
    ("MarianaIslands", MapId::MarianaIslands),
    ("Mariana Islands", MapId::MarianaIslands),
    ("Marianas", MapId::MarianaIslands),
    ("SinaiMap", MapId::SinaiMap),
    ("Sinai", MapId::SinaiMap),
    ("Falklands", MapId::Falklands),
    ("South Atlantic", MapId::Falklands),
    ("Kola", MapId::Kola),
];

/// Resolve a free-form theatre name to a supported map.
///
/// The exact table is consulted first; failing that, case-insensitive
/// substring heuristics are applied. Returns `None` when nothing matches,
/// which callers treat as "unmatched" rather than an error.
pub fn map_theatre_to_map_id(theatre: &str) -> Option<MapId> {
    let theatre = theatre.trim();
    if theatre.is_empty() {
        return None;
    }

    if let Some((_, id)) = THEATRE_TABLE.iter().find(|(name, _)| *name == theatre) {
        return Some(*id);
    }

    let lower = theatre.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    if has("caucasus") {
        Some(MapId::Caucasus)
    } else if has("persian") && has("gulf") {
        Some(MapId::PersianGulf)
    } else if has("nevada") || has("nttr") {
        Some(MapId::Nevada)
    } else if has("normandy") {
        Some(MapId::Normandy)
    } else if has("channel") {
        Some(MapId::TheChannel)
    } else if has("syria") {
        Some(MapId::Syria)
    } else if has("mariana") {
        Some(MapId::MarianaIslands)
    } else if has("sinai") {
        Some(MapId::SinaiMap)
    } else if has("falkland") || has("south atlantic") {
        Some(MapId::Falklands)
    } else if has("kola") {
        Some(MapId::Kola)
    } else {
        None
    }
}

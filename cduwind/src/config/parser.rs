//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::wind::MapId;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [ingestion] section
    if let Some(section) = ini.section(Some("ingestion")) {
        if let Some(v) = section.get("enabled") {
            config.ingestion.enabled = parse_bool(v);
        }
        if let Some(port) = parse_port(section, "ingestion", "port")? {
            config.ingestion.port = port;
        }
        if let Some(v) = section.get("max_line_length") {
            config.ingestion.max_line_length = match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(invalid(
                        "ingestion",
                        "max_line_length",
                        v,
                        "must be a positive number of bytes",
                    ))
                }
            };
        }
    }

    // [control] section
    if let Some(section) = ini.section(Some("control")) {
        if let Some(v) = section.get("host") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("control", "host", v, "must not be empty"));
            }
            config.control.host = v.to_string();
        }
        if let Some(port) = parse_port(section, "control", "send_port")? {
            config.control.send_port = port;
        }
        if let Some(port) = parse_port(section, "control", "receive_port")? {
            config.control.receive_port = port;
        }
    }

    // [sequence] section
    if let Some(section) = ini.section(Some("sequence")) {
        let timing = &mut config.sequence;
        for (key, field) in [
            ("press_delay_ms", &mut timing.press_delay_ms),
            ("release_delay_ms", &mut timing.release_delay_ms),
            ("line_select_delay_ms", &mut timing.line_select_delay_ms),
            ("page_hold_ms", &mut timing.page_hold_ms),
            ("page_settle_ms", &mut timing.page_settle_ms),
            ("error_settle_ms", &mut timing.error_settle_ms),
        ] {
            if let Some(v) = section.get(key) {
                *field = v.trim().parse().map_err(|_| {
                    invalid("sequence", key, v, "must be a non-negative integer (milliseconds)")
                })?;
            }
        }
    }

    // [wind] section
    if let Some(section) = ini.section(Some("wind")) {
        if let Some(v) = section.get("map") {
            config.wind.map = parse_map(v).map_err(|reason| invalid("wind", "map", v, &reason))?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_port(
    section: &Properties,
    section_name: &str,
    key: &str,
) -> Result<Option<u16>, ConfigFileError> {
    let Some(v) = section.get(key) else {
        return Ok(None);
    };
    match v.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(Some(port)),
        _ => Err(invalid(section_name, key, v, "must be a port number (1-65535)")),
    }
}

/// Parse an optional map identifier. Empty means "derive from theatre".
pub(super) fn parse_map(value: &str) -> Result<Option<MapId>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    MapId::from_str(value).map(Some).map_err(|_| {
        let names: Vec<&str> = MapId::ALL.iter().map(|m| m.as_str()).collect();
        format!("must be empty or one of: {}", names.join(", "))
    })
}

/// Parse a boolean value from a config string.
///
/// Accepts true/yes/1/on (case insensitive), everything else is false.
pub(super) fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "yes" | "1" | "on"
    )
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

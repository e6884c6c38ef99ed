//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let map = config.wind.map.map(|m| m.as_str()).unwrap_or("");

    format!(
        r#"[ingestion]
; Listen for weather briefings on 127.0.0.1 (true/false)
enabled = {}
; TCP port of the weather feed (default: 10309)
port = {}
; Longest accepted line in bytes; longer lines are discarded (default: 65536)
max_line_length = {}

[control]
; Host and port control commands are sent to (default: 127.0.0.1:7778)
host = {}
send_port = {}
; Local UDP port status reports arrive on (default: 7777)
receive_port = {}

[sequence]
; Button timing in milliseconds
press_delay_ms = {}
release_delay_ms = {}
; Wait after line-select and function keys
line_select_delay_ms = {}
; Page switch hold time and the wait after it recenters
page_hold_ms = {}
page_settle_ms = {}
; Wait before reading the status line for input errors
error_settle_ms = {}

[wind]
; Theatre map for magnetic variation. Leave empty to derive it from the
; mission theatre. One of: Caucasus, PersianGulf, Nevada, Normandy,
; TheChannel, Syria, MarianaIslands, SinaiMap, Falklands, Kola
map = {}

[logging]
; Log file, cleared at the start of each session
file = {}
"#,
        config.ingestion.enabled,
        config.ingestion.port,
        config.ingestion.max_line_length,
        config.control.host,
        config.control.send_port,
        config.control.receive_port,
        config.sequence.press_delay_ms,
        config.sequence.release_delay_ms,
        config.sequence.line_select_delay_ms,
        config.sequence.page_hold_ms,
        config.sequence.page_settle_ms,
        config.sequence.error_settle_ms,
        map,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

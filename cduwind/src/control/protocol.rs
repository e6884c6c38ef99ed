//! Text wire format of the control protocol.
//!
//! Outbound: `"<CONTROL_NAME> <integer>\n"`, one command per datagram.
//! Inbound: one or more `"<CONTROL_NAME> <value>\n"` lines per datagram,
//! where the value is free text running to the end of the line.

/// Encode one outbound command.
pub fn format_command(name: &str, value: i32) -> String {
    format!("{} {}\n", name, value)
}

/// Parse the `(name, value)` pairs of one inbound datagram.
///
/// Lines without a separating space or with an empty name are skipped. A
/// trailing `\r` is stripped. Invalid UTF-8 is replaced rather than rejected
/// so one bad byte does not hide the rest of the report.
pub fn parse_report(data: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(data);

    text.split('\n')
        .filter_map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let (name, value) = line.split_once(' ')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

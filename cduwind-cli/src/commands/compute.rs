//! Compute command - print the CDU wind table for a briefing.

use super::common::{print_table, WindArgs};
use crate::error::CliError;

/// Run the compute command.
pub fn run(args: WindArgs) -> Result<(), CliError> {
    let (map, rows) = args.compute()?;
    print_table(map, args.ground_temp(), &rows);
    Ok(())
}

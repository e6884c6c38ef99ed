//! Enter command - compute a briefing and drive the CDU once.

use std::sync::Arc;

use cduwind::sequence::{build_sequence, render_listing, SequenceOutcome, SequenceProgress};
use cduwind::service::WindEntryService;
use cduwind::wind::{CduRows, MapId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{print_table, WindArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the enter command.
pub struct EnterArgs {
    pub wind: WindArgs,
    pub dry_run: bool,
    pub debug: bool,
}

/// Run the enter command.
pub fn run(args: EnterArgs) -> Result<(), CliError> {
    let (map, rows) = args.wind.compute()?;
    print_table(map, args.wind.ground_temp(), &rows);
    println!();

    let runner = CliRunner::new(args.debug, false)?;
    runner.log_startup("enter");

    if args.dry_run {
        let commands = build_sequence(&rows, runner.config().sequence.timing())
            .map_err(|e| CliError::Config(e.to_string()))?;
        println!("[DRY RUN] {} commands:", commands.len());
        print!("{}", render_listing(&commands));
        return Ok(());
    }

    runner.block_on(enter(&runner, map, &rows))
}

async fn enter(runner: &CliRunner, map: MapId, rows: &CduRows) -> Result<(), CliError> {
    let link = runner.open_link().await?;
    let service = WindEntryService::new(Arc::clone(&link), runner.wind_entry_config(Some(map)));

    let (progress_tx, mut progress_rx) = mpsc::channel::<SequenceProgress>(64);
    let printer = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            println!("  {}", progress);
        }
    });

    println!("Entering winds on the CDU (Ctrl+C to cancel)...");
    let cancel = CancellationToken::new();
    let result = {
        let entry = service.enter_rows(rows, Some(&progress_tx), &cancel);
        tokio::pin!(entry);

        loop {
            tokio::select! {
                result = &mut entry => break result,
                _ = tokio::signal::ctrl_c() => {
                    println!("Cancelling...");
                    cancel.cancel();
                }
            }
        }
    };

    drop(progress_tx);
    let _ = printer.await;
    link.shutdown().await;

    report_outcome(result?)
}

/// Print how an entry ended, turning an abort into an error.
pub fn report_outcome(outcome: SequenceOutcome) -> Result<(), CliError> {
    match outcome {
        SequenceOutcome::Completed {
            unresolved_errors: 0,
        } => {
            info!("CDU entry complete");
            println!("✓ CDU entry complete");
            Ok(())
        }
        SequenceOutcome::Completed { unresolved_errors } => {
            println!(
                "CDU entry complete with {} unresolved input error(s); check the CDU pages",
                unresolved_errors
            );
            Ok(())
        }
        SequenceOutcome::Aborted { step, reason } => Err(CliError::Aborted { step, reason }),
    }
}

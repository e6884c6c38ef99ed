//! Run command - listen for weather briefings and enter winds on request.
//!
//! Press Enter to type the latest table into the CDU. Ctrl+C cancels an
//! entry in progress; with nothing running it exits, as does `q`.

use std::sync::Arc;

use cduwind::control::UdpControlLink;
use cduwind::ingestion::IngestionServer;
use cduwind::sequence::SequenceProgress;
use cduwind::service::{ComputedWinds, ServiceError, WindEntryConfig, WindEntryService};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use super::common::parse_map;
use super::enter::report_outcome;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
#[derive(Default)]
pub struct RunArgs {
    pub map: Option<String>,
    pub debug: bool,
}

type Service = WindEntryService<UdpControlLink>;

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let map = args.map.as_deref().map(parse_map).transpose()?;

    let runner = CliRunner::new(args.debug, false)?;
    runner.log_startup("run");

    runner.block_on(serve(&runner, runner.wind_entry_config(map)))
}

async fn serve(
    runner: &CliRunner,
    entry_config: WindEntryConfig,
) -> Result<(), CliError> {
    let config = runner.config();
    let shutdown = CancellationToken::new();
    let tasks = TaskTracker::new();

    println!("CDUWind v{}", cduwind::VERSION);
    println!("================");
    println!();

    match entry_config.map {
        Some(map) => println!("Map:        {} (fixed)", map),
        None => println!("Map:        from mission theatre"),
    }

    let link = runner.open_link().await?;
    println!(
        "CDU link:   sending to {}, reports on {}",
        link.peer_addr(),
        link.receive_addr()
    );

    let service: Arc<Service> = Arc::new(WindEntryService::new(Arc::clone(&link), entry_config));
    tasks.spawn(print_tables(service.subscribe_tables(), shutdown.clone()));

    let server = IngestionServer::new(config.ingestion.server_config());
    if config.ingestion.enabled {
        tasks.spawn({
            let service = Arc::clone(&service);
            let weather = server.subscribe_weather();
            let shutdown = shutdown.clone();
            async move { service.run_weather_loop(weather, shutdown).await }
        });
        tasks.spawn(print_connectivity(
            server.subscribe_connectivity(),
            shutdown.clone(),
        ));

        let addr = server.start(config.ingestion.port).await?;
        println!("Weather:    listening on {}", addr);
    } else {
        println!("Weather:    ingestion disabled (ingestion.enabled = false)");
    }

    println!();
    println!("Press Enter to type the latest winds into the CDU, 'q' to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut current_entry: Option<CancellationToken> = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                match current_entry.take() {
                    Some(cancel) if service.is_entry_running() => {
                        println!("Cancelling CDU entry...");
                        cancel.cancel();
                    }
                    _ => break,
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) if line.trim().eq_ignore_ascii_case("q") => break,
                    Ok(Some(_)) => {
                        if service.is_entry_running() {
                            println!("A CDU entry is already running");
                            continue;
                        }
                        let cancel = CancellationToken::new();
                        current_entry = Some(cancel.clone());
                        tasks.spawn(run_entry(Arc::clone(&service), cancel));
                    }
                    // stdin closed, keep serving until Ctrl+C
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        warn!(error = %e, "Failed to read from stdin");
                        break;
                    }
                }
            }
        }
    }

    println!("Shutting down...");
    info!("Shutting down");

    if let Some(cancel) = current_entry {
        cancel.cancel();
    }
    shutdown.cancel();
    server.stop().await;
    tasks.close();
    tasks.wait().await;
    link.shutdown().await;

    Ok(())
}

/// Enter the latest table, printing progress and the outcome.
async fn run_entry(service: Arc<Service>, cancel: CancellationToken) {
    let (progress_tx, mut progress_rx) = mpsc::channel::<SequenceProgress>(64);
    let printer = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            println!("  {}", progress);
        }
    });

    let result = service.enter_latest(Some(&progress_tx), &cancel).await;
    drop(progress_tx);
    let _ = printer.await;

    match result {
        Ok(outcome) => {
            if let Err(e) = report_outcome(outcome) {
                println!("{}", e);
            }
        }
        Err(ServiceError::NoWindData) => {
            println!("No weather briefing received yet, nothing to enter");
        }
        Err(e) if e.is_cancelled() => println!("CDU entry cancelled"),
        Err(e) => println!("CDU entry failed: {}", e),
    }
}

async fn print_tables(mut tables: broadcast::Receiver<ComputedWinds>, shutdown: CancellationToken) {
    loop {
        let received = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            received = tables.recv() => received,
        };

        match received {
            Ok(table) => {
                println!();
                let defaulted = if table.temperature_defaulted {
                    " (default)"
                } else {
                    ""
                };
                println!(
                    "New briefing from {}: {}, ground temp {}°C{}",
                    table.source, table.map, table.ground_temp_c, defaulted
                );
                for row in &table.rows {
                    println!("  {}", row);
                }
            }
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn print_connectivity(mut connectivity: broadcast::Receiver<bool>, shutdown: CancellationToken) {
    loop {
        let received = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            received = connectivity.recv() => received,
        };

        match received {
            Ok(true) => println!("Weather feed connected"),
            Ok(false) => println!("Weather feed idle"),
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

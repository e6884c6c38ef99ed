//! End-to-end tests for CDU entry over real sockets.
//!
//! A simulated CDU listens on UDP, records every command it receives and can
//! raise or clear a scratchpad error in response. The tests cover:
//! - Command stream produced by a full run
//! - Clear-and-retry recovery driven by peer reports
//! - Cancellation cleanup seen by the peer, including mid-clear
//! - Weather briefing over TCP through to CDU entry
//!
//! Run with: `cargo test --test sequence_integration`

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use cduwind::control::{ControlLinkConfig, UdpControlLink, CLEAR_CONTROL};
use cduwind::ingestion::{IngestionConfig, IngestionServer};
use cduwind::sequence::{
    build_sequence, SequenceEngine, SequenceError, SequenceOutcome, SequenceTiming,
};
use cduwind::service::{WindEntryConfig, WindEntryService};
use cduwind::wind::{compute, CduRows, MapId};
use cduwind::weather::WindLayer;

// ============================================================================
// Simulated CDU
// ============================================================================

const WAIT: Duration = Duration::from_secs(10);

/// How the simulated CDU reacts to commands.
#[derive(Clone, Default)]
struct Behavior {
    /// Report an input error the first time this exact command arrives.
    fail_once_on: Option<String>,
    /// Cancel this token when this exact command arrives.
    cancel_on: Option<(String, CancellationToken)>,
}

struct SimulatedCdu {
    port: u16,
    commands: mpsc::UnboundedReceiver<String>,
    shutdown: CancellationToken,
}

impl SimulatedCdu {
    /// Start the simulator. Reports go to `report_port` on loopback.
    async fn start(report_port: u16, behavior: Behavior) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();
        let (tx, commands) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        tokio::spawn(simulate(socket, report_port, behavior, tx, shutdown.clone()));

        Self {
            port,
            commands,
            shutdown,
        }
    }

    /// Every command received so far.
    fn drain(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(cmd) = self.commands.try_recv() {
            out.push(cmd);
        }
        out
    }
}

impl Drop for SimulatedCdu {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn simulate(
    socket: UdpSocket,
    report_port: u16,
    behavior: Behavior,
    tx: mpsc::UnboundedSender<String>,
    shutdown: CancellationToken,
) {
    let report_to = ("127.0.0.1", report_port);
    let mut failed = false;
    let mut buf = [0u8; 512];

    loop {
        let received = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut buf) => received,
        };
        let Ok((len, _)) = received else { break };
        let command = String::from_utf8_lossy(&buf[..len]).trim_end().to_string();

        if behavior.fail_once_on.as_deref() == Some(command.as_str()) && !failed {
            failed = true;
            let _ = socket.send_to(b"CDU_LINE9 INVALID ENTRY\n", report_to).await;
        }
        if command == format!("{} 0", CLEAR_CONTROL) {
            let _ = socket.send_to(b"CDU_LINE9 READY\n", report_to).await;
        }
        if let Some((trigger, token)) = &behavior.cancel_on {
            if *trigger == command {
                token.cancel();
            }
        }

        let _ = tx.send(command);
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

fn rows() -> CduRows {
    let wind = |speed, direction| WindLayer {
        speed,
        direction,
        nav_direction: None,
    };
    compute(&wind(10.0, 270.0), &wind(15.0, 290.0), &wind(40.0, 300.0), 20, "Caucasus").unwrap()
}

/// Reserve a free loopback UDP port for the link's receive socket.
fn free_udp_port() -> u16 {
    let socket = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.local_addr().unwrap().port()
}

async fn link_to(cdu: &SimulatedCdu, receive_port: u16) -> Arc<UdpControlLink> {
    let config = ControlLinkConfig {
        host: "127.0.0.1".to_string(),
        send_port: cdu.port,
        receive_host: "127.0.0.1".to_string(),
        receive_port,
        ..Default::default()
    };
    Arc::new(UdpControlLink::bind(config).await.unwrap())
}

fn timing(error_settle_ms: u64) -> SequenceTiming {
    SequenceTiming {
        error_settle: Duration::from_millis(error_settle_ms),
        ..SequenceTiming::immediate()
    }
}

/// Wire text for every command in a generated sequence.
fn expected_wire(rows: &CduRows) -> Vec<String> {
    build_sequence(rows, SequenceTiming::immediate())
        .unwrap()
        .iter()
        .map(|c| format!("{} {}", c.name, c.value))
        .collect()
}

/// Wait until the simulator has seen `count` commands in total.
async fn collect(cdu: &mut SimulatedCdu, count: usize) -> Vec<String> {
    let mut seen = Vec::new();
    timeout(WAIT, async {
        while seen.len() < count {
            match cdu.commands.recv().await {
                Some(cmd) => seen.push(cmd),
                None => break,
            }
        }
    })
    .await
    .expect("simulated CDU did not receive enough commands");
    seen
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_full_run_sends_generated_sequence() {
    let receive_port = free_udp_port();
    let mut cdu = SimulatedCdu::start(receive_port, Behavior::default()).await;
    let link = link_to(&cdu, receive_port).await;

    let rows = rows();
    let commands = build_sequence(&rows, timing(0)).unwrap();
    let engine = SequenceEngine::new(Arc::clone(&link), timing(0));

    let outcome = engine
        .execute(&commands, None, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        SequenceOutcome::Completed {
            unresolved_errors: 0
        }
    );

    let expected = expected_wire(&rows);
    let seen = collect(&mut cdu, expected.len()).await;
    assert_eq!(seen, expected);
    assert_eq!(seen[..3], ["CDU_SYS 1", "CDU_SYS 0", "CDU_LSK_7R 1"]);

    link.shutdown().await;
}

#[tokio::test]
async fn test_peer_error_is_cleared_and_command_retried() {
    let receive_port = free_udp_port();
    let behavior = Behavior {
        fail_once_on: Some("CDU_LSK_7R 1".to_string()),
        ..Default::default()
    };
    let mut cdu = SimulatedCdu::start(receive_port, behavior).await;
    let link = link_to(&cdu, receive_port).await;

    let rows = rows();
    let commands = build_sequence(&rows, timing(20)).unwrap();
    let engine = SequenceEngine::new(Arc::clone(&link), timing(20));

    let outcome = timeout(
        WAIT,
        engine.execute(&commands, None, &CancellationToken::new()),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(outcome.is_completed());
    assert_eq!(
        outcome,
        SequenceOutcome::Completed {
            unresolved_errors: 0
        }
    );

    let seen = collect(&mut cdu, expected_wire(&rows).len() + 3).await;
    assert_eq!(
        seen[..7],
        [
            "CDU_SYS 1",
            "CDU_SYS 0",
            "CDU_LSK_7R 1",
            "CDU_CLR 1",
            "CDU_CLR 0",
            "CDU_LSK_7R 1",
            "CDU_LSK_7R 0",
        ]
    );
    assert!(cdu.drain().is_empty());

    link.shutdown().await;
}

#[tokio::test]
async fn test_cancel_releases_held_key_on_peer() {
    let receive_port = free_udp_port();
    let cancel = CancellationToken::new();
    let behavior = Behavior {
        cancel_on: Some(("CDU_SYS 1".to_string(), cancel.clone())),
        ..Default::default()
    };
    let mut cdu = SimulatedCdu::start(receive_port, behavior).await;
    let link = link_to(&cdu, receive_port).await;

    // A long press delay keeps the key held when the cancel lands
    let slow = SequenceTiming {
        press: Duration::from_secs(5),
        ..SequenceTiming::immediate()
    };
    let commands = build_sequence(&rows(), slow).unwrap();
    let engine = SequenceEngine::new(Arc::clone(&link), slow);

    let result = timeout(WAIT, engine.execute(&commands, None, &cancel))
        .await
        .expect("cancellation was not honored");
    assert_eq!(result, Err(SequenceError::Cancelled));

    let seen = collect(&mut cdu, 2).await;
    assert_eq!(seen, ["CDU_SYS 1", "CDU_SYS 0"]);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(cdu.drain().is_empty());

    link.shutdown().await;
}

#[tokio::test]
async fn test_cancel_during_clear_releases_keys_on_peer() {
    let receive_port = free_udp_port();
    let cancel = CancellationToken::new();
    let behavior = Behavior {
        fail_once_on: Some("CDU_LSK_7R 1".to_string()),
        cancel_on: Some((format!("{} 1", CLEAR_CONTROL), cancel.clone())),
    };
    let mut cdu = SimulatedCdu::start(receive_port, behavior).await;
    let link = link_to(&cdu, receive_port).await;

    let commands = build_sequence(&rows(), timing(20)).unwrap();
    let engine = SequenceEngine::new(Arc::clone(&link), timing(20));

    let result = timeout(WAIT, engine.execute(&commands, None, &cancel))
        .await
        .expect("cancellation was not honored");
    assert_eq!(result, Err(SequenceError::Cancelled));

    let seen = collect(&mut cdu, 6).await;
    assert_eq!(
        seen,
        [
            "CDU_SYS 1",
            "CDU_SYS 0",
            "CDU_LSK_7R 1",
            "CDU_CLR 1",
            "CDU_CLR 0",
            "CDU_LSK_7R 0",
        ]
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(cdu.drain().is_empty());

    link.shutdown().await;
}

#[tokio::test]
async fn test_briefing_to_cdu_entry() {
    let receive_port = free_udp_port();
    let mut cdu = SimulatedCdu::start(receive_port, Behavior::default()).await;
    let link = link_to(&cdu, receive_port).await;

    let service = Arc::new(WindEntryService::new(
        Arc::clone(&link),
        WindEntryConfig {
            map: None,
            timing: timing(0),
        },
    ));
    let mut tables = service.subscribe_tables();

    let server = IngestionServer::new(IngestionConfig::default());
    let shutdown = CancellationToken::new();
    let weather_loop = tokio::spawn({
        let service = Arc::clone(&service);
        let weather = server.subscribe_weather();
        let shutdown = shutdown.clone();
        async move { service.run_weather_loop(weather, shutdown).await }
    });
    let addr = server.start(0).await.unwrap();

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(
            concat!(
                r#"{"ground":{"speed":10.0,"direction":270.0},"#,
                r#""at2000m":{"speed":15.0,"direction":290.0},"#,
                r#""at8000m":{"speed":40.0,"direction":300.0},"#,
                r#""groundTemp":20,"timestamp":1700000000,"source":"briefing","#,
                r#""mission":{"theatre":"Caucasus"}}"#,
                "\n"
            )
            .as_bytes(),
        )
        .await
        .unwrap();

    let table = timeout(WAIT, tables.recv()).await.unwrap().unwrap();
    assert_eq!(table.map, MapId::Caucasus);
    assert_eq!(table.rows, rows());
    assert!(!table.temperature_defaulted);

    let (progress_tx, mut progress_rx) = mpsc::channel(512);
    let outcome = service
        .enter_latest(Some(&progress_tx), &CancellationToken::new())
        .await
        .unwrap();
    assert!(outcome.is_completed());

    let expected = expected_wire(&rows());
    let seen = collect(&mut cdu, expected.len()).await;
    assert_eq!(seen, expected);

    let first = progress_rx.recv().await.unwrap();
    assert_eq!(first.step, 0);
    assert_eq!(first.total, expected.len());

    shutdown.cancel();
    weather_loop.await.unwrap();
    server.stop().await;
    link.shutdown().await;
}

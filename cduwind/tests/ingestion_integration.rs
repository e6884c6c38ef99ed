//! Integration tests for the weather ingestion server.
//!
//! These tests drive the server over real loopback TCP connections:
//! - Line framing across and within writes
//! - Malformed input handling without dropping the connection
//! - Listener restart semantics
//! - Edge-triggered connectivity
//!
//! Run with: `cargo test --test ingestion_integration`

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time::timeout;

use cduwind::ingestion::{IngestionConfig, IngestionServer};
use cduwind::weather::WeatherSnapshot;

// ============================================================================
// Test Helpers
// ============================================================================

const WAIT: Duration = Duration::from_secs(2);

fn briefing(timestamp: i64) -> String {
    format!(
        concat!(
            r#"{{"ground":{{"speed":10.0,"direction":270.0}},"#,
            r#""at2000m":{{"speed":12.5,"direction":280.0,"navDirection":100.0}},"#,
            r#""at8000m":{{"speed":30.0,"direction":300.0}},"#,
            r#""groundTemp":20,"timestamp":{},"source":"test","#,
            r#""mission":{{"theatre":"Caucasus","sortie":"CAP","start_time":28800}}}}"#
        ),
        timestamp
    )
}

async fn started_server(config: IngestionConfig) -> (IngestionServer, SocketAddr) {
    let server = IngestionServer::new(config);
    let addr = server.start(0).await.expect("bind loopback");
    (server, addr)
}

async fn next_snapshot(rx: &mut broadcast::Receiver<WeatherSnapshot>) -> WeatherSnapshot {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for weather")
        .expect("weather channel closed")
}

async fn next_connectivity(rx: &mut broadcast::Receiver<bool>) -> bool {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for connectivity")
        .expect("connectivity channel closed")
}

async fn assert_no_snapshot(rx: &mut broadcast::Receiver<WeatherSnapshot>) {
    let result = timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(result.is_err(), "unexpected weather event: {:?}", result);
}

// ============================================================================
// Framing
// ============================================================================

#[tokio::test]
async fn test_two_messages_in_one_write_yield_two_events() {
    let (server, addr) = started_server(IngestionConfig::default()).await;
    let mut weather = server.subscribe_weather();

    let mut client = TcpStream::connect(addr).await.unwrap();
    let payload = format!("{}\n{}\n", briefing(1), briefing(2));
    client.write_all(payload.as_bytes()).await.unwrap();

    assert_eq!(next_snapshot(&mut weather).await.timestamp, 1);
    assert_eq!(next_snapshot(&mut weather).await.timestamp, 2);
    assert_no_snapshot(&mut weather).await;

    server.stop().await;
}

#[tokio::test]
async fn test_message_split_across_writes_yields_one_event() {
    let (server, addr) = started_server(IngestionConfig::default()).await;
    let mut weather = server.subscribe_weather();

    let mut client = TcpStream::connect(addr).await.unwrap();
    let line = format!("{}\r\n", briefing(7));
    let (head, tail) = line.split_at(line.len() / 2);

    client.write_all(head.as_bytes()).await.unwrap();
    client.flush().await.unwrap();
    assert_no_snapshot(&mut weather).await;

    client.write_all(tail.as_bytes()).await.unwrap();
    let snapshot = next_snapshot(&mut weather).await;

    assert_eq!(snapshot.timestamp, 7);
    assert_eq!(snapshot.ground_temp, Some(20));
    assert_eq!(snapshot.mid.nav_direction, Some(100.0));
    assert_eq!(snapshot.theatre(), Some("Caucasus"));
    assert_no_snapshot(&mut weather).await;

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_line_keeps_connection_open() {
    let (server, addr) = started_server(IngestionConfig::default()).await;
    let mut weather = server.subscribe_weather();

    let mut client = TcpStream::connect(addr).await.unwrap();
    client.write_all(b"{not json}\n").await.unwrap();
    client
        .write_all(br#"{"ground":{"speed":-1.0,"direction":0.0},"at2000m":{"speed":1.0,"direction":0.0},"at8000m":{"speed":1.0,"direction":0.0},"timestamp":1}"#)
        .await
        .unwrap();
    client.write_all(b"\n").await.unwrap();
    client
        .write_all(format!("{}\n", briefing(3)).as_bytes())
        .await
        .unwrap();

    assert_eq!(next_snapshot(&mut weather).await.timestamp, 3);
    assert_eq!(server.connection_count(), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_overlong_line_is_skipped() {
    let config = IngestionConfig {
        max_line_length: 256,
        ..Default::default()
    };
    let (server, addr) = started_server(config).await;
    let mut weather = server.subscribe_weather();

    let mut client = TcpStream::connect(addr).await.unwrap();
    let junk = "x".repeat(1024);
    client
        .write_all(format!("{}\n{}\n", junk, briefing(9)).as_bytes())
        .await
        .unwrap();

    assert_eq!(next_snapshot(&mut weather).await.timestamp, 9);

    server.stop().await;
}

#[tokio::test]
async fn test_concurrent_clients() {
    let (server, addr) = started_server(IngestionConfig::default()).await;
    let mut weather = server.subscribe_weather();

    let mut first = TcpStream::connect(addr).await.unwrap();
    let mut second = TcpStream::connect(addr).await.unwrap();
    first
        .write_all(format!("{}\n", briefing(10)).as_bytes())
        .await
        .unwrap();
    second
        .write_all(format!("{}\n", briefing(20)).as_bytes())
        .await
        .unwrap();

    let mut seen = vec![
        next_snapshot(&mut weather).await.timestamp,
        next_snapshot(&mut weather).await.timestamp,
    ];
    seen.sort_unstable();
    assert_eq!(seen, vec![10, 20]);

    server.stop().await;
}

// ============================================================================
// Listener lifecycle
// ============================================================================

#[tokio::test]
async fn test_restart_on_same_port_is_noop() {
    let (server, addr) = started_server(IngestionConfig::default()).await;
    let mut weather = server.subscribe_weather();

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(format!("{}\n", briefing(1)).as_bytes())
        .await
        .unwrap();
    next_snapshot(&mut weather).await;

    let again = server.start(0).await.unwrap();
    assert_eq!(again, addr);

    // The existing connection survives
    client
        .write_all(format!("{}\n", briefing(2)).as_bytes())
        .await
        .unwrap();
    assert_eq!(next_snapshot(&mut weather).await.timestamp, 2);

    server.stop().await;
}

#[tokio::test]
async fn test_different_port_replaces_listener() {
    let (server, old_addr) = started_server(IngestionConfig::default()).await;
    let mut weather = server.subscribe_weather();

    let mut old_client = TcpStream::connect(old_addr).await.unwrap();
    old_client
        .write_all(format!("{}\n", briefing(1)).as_bytes())
        .await
        .unwrap();
    next_snapshot(&mut weather).await;

    // Find a free port for the new listener
    let reserved = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let new_port = reserved.local_addr().unwrap().port();
    drop(reserved);

    let new_addr = server.start(new_port).await.unwrap();
    assert_eq!(new_addr.port(), new_port);
    assert_eq!(server.local_addr().await, Some(new_addr));

    // The old connection was closed and the old port no longer accepts
    let _ = old_client
        .write_all(format!("{}\n", briefing(2)).as_bytes())
        .await;
    assert_no_snapshot(&mut weather).await;
    assert!(TcpStream::connect(old_addr).await.is_err());

    let mut new_client = TcpStream::connect(new_addr).await.unwrap();
    new_client
        .write_all(format!("{}\n", briefing(3)).as_bytes())
        .await
        .unwrap();
    assert_eq!(next_snapshot(&mut weather).await.timestamp, 3);

    server.stop().await;
}

#[tokio::test]
async fn test_stop_closes_connections() {
    let (server, addr) = started_server(IngestionConfig::default()).await;
    let _client = TcpStream::connect(addr).await.unwrap();

    timeout(WAIT, async {
        while server.connection_count() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    server.stop().await;
    assert!(!server.is_listening());
    assert_eq!(server.connection_count(), 0);
}

// ============================================================================
// Connectivity
// ============================================================================

#[tokio::test]
async fn test_connectivity_is_edge_triggered() {
    let config = IngestionConfig {
        message_timeout: Duration::from_millis(300),
        liveness_check_interval: Duration::from_millis(50),
        ..Default::default()
    };
    let (server, addr) = started_server(config).await;
    let mut connectivity = server.subscribe_connectivity();
    let mut weather = server.subscribe_weather();

    // A connection alone is not enough
    let mut client = TcpStream::connect(addr).await.unwrap();
    assert!(timeout(Duration::from_millis(150), connectivity.recv())
        .await
        .is_err());

    client
        .write_all(format!("{}\n{}\n", briefing(1), briefing(2)).as_bytes())
        .await
        .unwrap();
    next_snapshot(&mut weather).await;
    next_snapshot(&mut weather).await;

    // Two messages, one rising edge
    assert!(next_connectivity(&mut connectivity).await);
    assert!(server.is_connected());

    // Silence past the timeout drops it
    assert!(!next_connectivity(&mut connectivity).await);
    assert!(!server.is_connected());

    client
        .write_all(format!("{}\n", briefing(3)).as_bytes())
        .await
        .unwrap();
    assert!(next_connectivity(&mut connectivity).await);

    drop(client);
    assert!(!next_connectivity(&mut connectivity).await);

    server.stop().await;
}

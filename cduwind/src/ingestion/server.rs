//! Loopback TCP server for the line-delimited weather feed.
//!
//! One accept loop runs per listener and spawns one handler task per
//! connection. All tasks belong to the listener's [`TaskTracker`] and observe
//! its [`CancellationToken`], so stopping the listener also closes every
//! connection it accepted.
//!
//! Listener transitions (`start`/`stop`) are serialized by a single async
//! mutex that is held across the whole stop-then-rebind sequence.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, trace, warn};

use super::codec::{LineFrame, WeatherLineCodec};
use super::config::IngestionConfig;
use super::error::IngestionError;
use crate::weather::WeatherSnapshot;

/// A running listener and the tasks it owns.
struct ActiveListener {
    /// Port passed to `start`, compared for idempotency (may be 0).
    requested_port: u16,
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

/// State shared between the server handle and its tasks.
struct Shared {
    config: IngestionConfig,
    weather_tx: broadcast::Sender<WeatherSnapshot>,
    connectivity_tx: broadcast::Sender<bool>,
    listening: AtomicBool,
    connections: AtomicUsize,
    last_message: Mutex<Option<Instant>>,
    /// Last connectivity value that was published.
    connected: Mutex<bool>,
}

impl Shared {
    fn is_live(&self) -> bool {
        let fresh = self
            .last_message
            .lock()
            .is_some_and(|at| at.elapsed() <= self.config.message_timeout);

        self.listening.load(Ordering::SeqCst) && self.connections.load(Ordering::SeqCst) > 0 && fresh
    }

    /// Recompute connectivity and publish it if it changed.
    fn refresh_connectivity(&self) {
        let mut connected = self.connected.lock();
        let live = self.is_live();
        if *connected != live {
            *connected = live;
            info!(connected = live, "Weather feed connectivity changed");
            // No subscribers is fine
            let _ = self.connectivity_tx.send(live);
        }
    }

    fn handle_line(&self, line: &str, peer: SocketAddr) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        match WeatherSnapshot::from_json_line(line) {
            Ok(snapshot) => {
                *self.last_message.lock() = Some(Instant::now());
                trace!(%peer, timestamp = snapshot.timestamp, source = %snapshot.source, "Weather message parsed");
                let _ = self.weather_tx.send(snapshot);
                self.refresh_connectivity();
            }
            Err(e) => {
                let preview: String = line.chars().take(80).collect();
                warn!(%peer, error = %e, preview = %preview, "Discarding malformed weather line");
            }
        }
    }
}

/// Decrements the live connection count when a handler exits.
struct ConnectionGuard {
    shared: Arc<Shared>,
}

impl ConnectionGuard {
    fn register(shared: Arc<Shared>) -> Self {
        shared.connections.fetch_add(1, Ordering::SeqCst);
        shared.refresh_connectivity();
        Self { shared }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.shared.connections.fetch_sub(1, Ordering::SeqCst);
        self.shared.refresh_connectivity();
    }
}

/// TCP ingestion server for weather briefings.
///
/// # Example
///
/// ```ignore
/// let server = IngestionServer::new(IngestionConfig::default());
/// let mut weather = server.subscribe_weather();
/// server.start(DEFAULT_INGESTION_PORT).await?;
///
/// while let Ok(snapshot) = weather.recv().await {
///     println!("ground wind {:?}", snapshot.ground);
/// }
/// ```
pub struct IngestionServer {
    shared: Arc<Shared>,
    listener: tokio::sync::Mutex<Option<ActiveListener>>,
}

impl IngestionServer {
    /// Create a stopped server.
    pub fn new(config: IngestionConfig) -> Self {
        let (weather_tx, _) = broadcast::channel(config.channel_capacity);
        let (connectivity_tx, _) = broadcast::channel(config.channel_capacity);

        Self {
            shared: Arc::new(Shared {
                config,
                weather_tx,
                connectivity_tx,
                listening: AtomicBool::new(false),
                connections: AtomicUsize::new(0),
                last_message: Mutex::new(None),
                connected: Mutex::new(false),
            }),
            listener: tokio::sync::Mutex::new(None),
        }
    }

    /// Subscribe to parsed weather messages.
    pub fn subscribe_weather(&self) -> broadcast::Receiver<WeatherSnapshot> {
        self.shared.weather_tx.subscribe()
    }

    /// Subscribe to connectivity changes (edge-triggered).
    pub fn subscribe_connectivity(&self) -> broadcast::Receiver<bool> {
        self.shared.connectivity_tx.subscribe()
    }

    /// Whether a listener is currently bound.
    pub fn is_listening(&self) -> bool {
        self.shared.listening.load(Ordering::SeqCst)
    }

    /// Last published connectivity value.
    pub fn is_connected(&self) -> bool {
        *self.shared.connected.lock()
    }

    /// Number of live client connections.
    pub fn connection_count(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }

    /// Address of the bound listener, if any.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.lock().await.as_ref().map(|l| l.local_addr)
    }

    /// Start listening on `127.0.0.1:port`.
    ///
    /// Calling this again with the same port while listening is a no-op that
    /// keeps existing connections. A different port stops the current
    /// listener (closing its connections) and binds the new one. On bind
    /// failure the server is left stopped.
    pub async fn start(&self, port: u16) -> Result<SocketAddr, IngestionError> {
        let mut active = self.listener.lock().await;

        if let Some(current) = active.as_ref() {
            if current.requested_port == port {
                debug!(port, "Ingestion listener already running on requested port");
                return Ok(current.local_addr);
            }
        }

        if let Some(previous) = active.take() {
            info!(
                old_port = previous.local_addr.port(),
                new_port = port,
                "Rebinding ingestion listener"
            );
            self.shutdown_listener(previous).await;
        }

        let listener = match TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await {
            Ok(listener) => listener,
            Err(source) => {
                warn!(port, error = %source, "Failed to bind ingestion listener");
                return Err(IngestionError::Bind { port, source });
            }
        };
        let local_addr = listener.local_addr().map_err(IngestionError::LocalAddr)?;

        let shutdown = CancellationToken::new();
        let tasks = TaskTracker::new();

        self.shared.listening.store(true, Ordering::SeqCst);
        tasks.spawn(accept_loop(
            listener,
            Arc::clone(&self.shared),
            shutdown.clone(),
            tasks.clone(),
        ));
        tasks.spawn(liveness_monitor(Arc::clone(&self.shared), shutdown.clone()));

        info!(
            %local_addr,
            max_line_length = self.shared.config.max_line_length,
            "Ingestion listener started"
        );

        *active = Some(ActiveListener {
            requested_port: port,
            local_addr,
            shutdown,
            tasks,
        });
        self.shared.refresh_connectivity();

        Ok(local_addr)
    }

    /// Stop listening and close all connections. Safe when not listening.
    pub async fn stop(&self) {
        let mut active = self.listener.lock().await;
        match active.take() {
            Some(previous) => self.shutdown_listener(previous).await,
            None => debug!("Ingestion listener not running, nothing to stop"),
        }
    }

    async fn shutdown_listener(&self, listener: ActiveListener) {
        listener.shutdown.cancel();
        listener.tasks.close();
        listener.tasks.wait().await;

        self.shared.listening.store(false, Ordering::SeqCst);
        self.shared.refresh_connectivity();
        info!(local_addr = %listener.local_addr, "Ingestion listener stopped");
    }
}

impl Drop for IngestionServer {
    fn drop(&mut self) {
        if let Some(active) = self.listener.get_mut() {
            active.shutdown.cancel();
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    shared: Arc<Shared>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
) {
    loop {
        let accepted = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, peer)) => {
                tasks.spawn(handle_connection(
                    stream,
                    peer,
                    Arc::clone(&shared),
                    shutdown.child_token(),
                ));
            }
            Err(e) => {
                warn!(error = %e, "Failed to accept ingestion connection");
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    }

    debug!("Ingestion accept loop stopped");
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    shared: Arc<Shared>,
    shutdown: CancellationToken,
) {
    let _guard = ConnectionGuard::register(Arc::clone(&shared));
    info!(%peer, "Ingestion client connected");

    let codec = WeatherLineCodec::new(shared.config.max_line_length);
    let mut frames = FramedRead::new(stream, codec);
    let mut lines: u64 = 0;

    loop {
        let frame = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            frame = frames.next() => frame,
        };

        match frame {
            Some(Ok(LineFrame::Line(line))) => {
                lines += 1;
                shared.handle_line(&line, peer);
            }
            Some(Ok(LineFrame::InvalidUtf8 { len })) => {
                warn!(%peer, len, "Discarding line with invalid UTF-8");
            }
            Some(Ok(LineFrame::Overlong { discarded })) => {
                warn!(
                    %peer,
                    discarded,
                    max = frames.decoder().max_length(),
                    "Discarding overlong line"
                );
            }
            Some(Err(e)) => {
                warn!(%peer, error = %e, "Ingestion connection read error");
                break;
            }
            None => break,
        }
    }

    info!(%peer, lines, "Ingestion client disconnected");
}

async fn liveness_monitor(shared: Arc<Shared>, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(shared.config.liveness_check_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => shared.refresh_connectivity(),
        }
    }
}

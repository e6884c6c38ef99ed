//! UDP implementation of [`ControlLink`].
//!
//! Commands go out on an ephemeral socket; status reports arrive on the
//! configured receive port and are folded into a shared snapshot by a single
//! background task.
//!
//! # Example
//!
//! ```ignore
//! let link = UdpControlLink::bind(ControlLinkConfig::default()).await?;
//! link.send_control("CDU_SYS", 1).await;
//! println!("status: {:?}", link.value("CDU_LINE9"));
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::config::ControlLinkConfig;
use super::error::ControlLinkError;
use super::link::ControlLink;
use super::protocol::{format_command, parse_report};

/// Largest status datagram we accept.
const MAX_DATAGRAM_SIZE: usize = 64 * 1024;

/// Snapshot written by the receive loop.
#[derive(Default)]
struct Reports {
    values: HashMap<String, String>,
    last_report: Option<Instant>,
}

/// Control link over UDP.
pub struct UdpControlLink {
    send_socket: UdpSocket,
    peer: SocketAddr,
    receive_addr: SocketAddr,
    reports: Arc<Mutex<Reports>>,
    shutdown: CancellationToken,
    receiver: Mutex<Option<JoinHandle<()>>>,
}

impl UdpControlLink {
    /// Bind both sockets and start the receive loop.
    pub async fn bind(config: ControlLinkConfig) -> Result<Self, ControlLinkError> {
        let peer = tokio::net::lookup_host((config.host.as_str(), config.send_port))
            .await
            .map_err(|e| ControlLinkError::Resolve {
                host: config.host.clone(),
                port: config.send_port,
                reason: e.to_string(),
            })?
            .next()
            .ok_or_else(|| ControlLinkError::Resolve {
                host: config.host.clone(),
                port: config.send_port,
                reason: "no addresses".to_string(),
            })?;

        let unspecified = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let send_socket = UdpSocket::bind(unspecified)
            .await
            .map_err(ControlLinkError::SendBind)?;

        let receive_bind = format!("{}:{}", config.receive_host, config.receive_port);
        let receive_socket =
            UdpSocket::bind(&receive_bind)
                .await
                .map_err(|source| ControlLinkError::ReceiveBind {
                    addr: receive_bind.clone(),
                    source,
                })?;
        let receive_addr = receive_socket
            .local_addr()
            .map_err(|source| ControlLinkError::ReceiveBind {
                addr: receive_bind,
                source,
            })?;

        let reports = Arc::new(Mutex::new(Reports::default()));
        let shutdown = CancellationToken::new();
        let receiver = tokio::spawn(receive_loop(
            receive_socket,
            Arc::clone(&reports),
            shutdown.clone(),
            config.receive_backoff,
        ));

        info!(%peer, %receive_addr, "Control link started");

        Ok(Self {
            send_socket,
            peer,
            receive_addr,
            reports,
            shutdown,
            receiver: Mutex::new(Some(receiver)),
        })
    }

    /// Address commands are sent to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Local address status reports are received on.
    pub fn receive_addr(&self) -> SocketAddr {
        self.receive_addr
    }

    /// When the most recent status datagram arrived.
    pub fn last_report(&self) -> Option<Instant> {
        self.reports.lock().last_report
    }

    /// Stop the receive loop and wait for it to finish.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handle = self.receiver.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Control receive task ended abnormally");
            }
        }
    }
}

impl ControlLink for UdpControlLink {
    async fn send_control(&self, name: &str, value: i32) -> bool {
        let message = format_command(name, value);
        match self.send_socket.send_to(message.as_bytes(), self.peer).await {
            Ok(_) => {
                trace!(control = name, value, "Control command sent");
                true
            }
            Err(e) => {
                warn!(control = name, value, error = %e, "Failed to send control command");
                false
            }
        }
    }

    fn value(&self, name: &str) -> Option<String> {
        self.reports.lock().values.get(name).cloned()
    }

    fn snapshot(&self) -> HashMap<String, String> {
        self.reports.lock().values.clone()
    }
}

impl Drop for UdpControlLink {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn receive_loop(
    socket: UdpSocket,
    reports: Arc<Mutex<Reports>>,
    shutdown: CancellationToken,
    backoff: Duration,
) {
    let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];
    let mut datagrams: u64 = 0;

    loop {
        let received = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut buffer) => received,
        };

        match received {
            Ok((len, from)) => {
                datagrams += 1;
                let pairs = parse_report(&buffer[..len]);
                if datagrams == 1 {
                    info!(%from, len, controls = pairs.len(), "Received first control report");
                }

                let mut state = reports.lock();
                for (name, value) in pairs {
                    trace!(control = %name, value = %value, "Control value reported");
                    state.values.insert(name, value);
                }
                state.last_report = Some(Instant::now());
            }
            Err(e) => {
                warn!(error = %e, "Control receive error");
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(backoff) => {}
                }
            }
        }
    }

    debug!(datagrams, "Control receive loop stopped");
}

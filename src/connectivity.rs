//! Network reachability signals.
//!
//! A terminal has no browser "online"/"offline" events, so reachability is
//! sampled with a [`ConnectivityProbe`] and turned into edge signals by
//! [`ConnectivityTracker`].

use crate::config::ConnectivityConfig;
use crate::events::Event;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivitySignal {
    /// The startup check found no connection.
    AbsentAtLoad,
    Lost,
    Restored,
}

#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Considers the network reachable when a TCP handshake with `addr`
/// completes within `timeout`.
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ConnectivityConfig) -> Self {
        Self::new(
            config.probe_addr.clone(),
            Duration::from_millis(config.probe_timeout_ms),
        )
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn is_online(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("Probe to {} failed: {}", self.addr, e);
                false
            }
            Err(_) => {
                debug!("Probe to {} timed out", self.addr);
                false
            }
        }
    }
}

/// Remembers the last sample and reports only changes.
#[derive(Debug, Clone, Copy)]
pub struct ConnectivityTracker {
    online: bool,
}

impl ConnectivityTracker {
    pub fn new(online: bool) -> Self {
        Self { online }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn observe(&mut self, online: bool) -> Option<ConnectivitySignal> {
        let signal = match (self.online, online) {
            (true, false) => Some(ConnectivitySignal::Lost),
            (false, true) => Some(ConnectivitySignal::Restored),
            _ => None,
        };
        self.online = online;
        signal
    }
}

/// Samples `probe` every `interval` and posts edge signals to `tx`.
///
/// The task ends once the receiving side of `tx` is gone.
pub fn spawn_monitor(
    probe: Arc<dyn ConnectivityProbe>,
    interval: Duration,
    initially_online: bool,
    tx: mpsc::UnboundedSender<Event>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tracker = ConnectivityTracker::new(initially_online);
        loop {
            tokio::time::sleep(interval).await;
            let online = probe.is_online().await;
            if let Some(signal) = tracker.observe(online) {
                match signal {
                    ConnectivitySignal::Lost => warn!("Connectivity lost"),
                    _ => info!("Connectivity {:?}", signal),
                }
                if tx.send(Event::Connectivity(signal)).is_err() {
                    break;
                }
            }
        }
    })
}

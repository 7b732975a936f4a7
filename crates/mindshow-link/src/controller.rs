// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-controller connection task
//!
//! Each controller runs its own state machine:
//!
//! ```text
//! Disconnected → Connecting → Connected → Disconnected (on error)
//!                     ↑                 ↘ Backoff (before retry)
//!                     └─────────────────────┘
//! ```
//!
//! While connected, the task applies its dispatch gate to each incoming
//! update and serializes permitted ones into protocol frames. The task
//! remembers which pattern it last put on the wire and switches whenever
//! an update names a different one; updates arrive latest-wins, so the
//! tick that carried a transition may never be observed at all. Pending
//! updates are dropped on disconnect - after a reconnect the wire state
//! is forgotten, which makes the next update a forced full resync.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use mindshow_core::{DispatchGate, ShowUpdate};

use crate::backoff::ReconnectPolicy;
use crate::error::{LinkError, LinkResult};
use crate::manager::LinkConfig;
use crate::protocol;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection lifecycle state, readable from outside the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Backoff,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Backoff => "backoff",
        };
        f.write_str(s)
    }
}

/// One configured lighting controller endpoint.
#[derive(Debug, Clone)]
pub struct ControllerSpec {
    pub name: String,
    /// Host, host:port, or full ws:// URL
    pub address: String,
}

impl ControllerSpec {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Normalize the configured address into a websocket URL.
    pub(crate) fn websocket_url(&self, default_port: u16) -> LinkResult<String> {
        let address = self.address.trim();
        if address.is_empty() {
            return Err(LinkError::InvalidAddress(self.address.clone()));
        }
        if address.starts_with("ws://") || address.starts_with("wss://") {
            return Ok(address.to_string());
        }
        if address.contains(':') {
            return Ok(format!("ws://{address}"));
        }
        Ok(format!("ws://{address}:{default_port}"))
    }
}

/// Why the serve loop handed control back to the connect loop.
enum ServeExit {
    /// Link died; reconnect through backoff
    Failed(LinkError),
    /// Shutdown requested; close and stop
    Shutdown,
}

/// State owned by one controller task.
pub(crate) struct ControllerRuntime {
    spec: ControllerSpec,
    url: String,
    config: LinkConfig,
    gate: DispatchGate,
    /// Pattern last confirmed sent on the current connection
    wire_pattern: Option<String>,
    state: Arc<RwLock<ConnectionState>>,
}

impl ControllerRuntime {
    pub(crate) fn new(
        spec: ControllerSpec,
        config: LinkConfig,
        gate: DispatchGate,
        state: Arc<RwLock<ConnectionState>>,
    ) -> LinkResult<Self> {
        let url = spec.websocket_url(config.default_port)?;
        Ok(Self {
            spec,
            url,
            config,
            gate,
            wire_pattern: None,
            state,
        })
    }

    fn set_state(&self, next: ConnectionState) {
        *self.state.write() = next;
    }

    /// Connect/serve/backoff loop; runs until shutdown.
    pub(crate) async fn run(
        mut self,
        mut updates: watch::Receiver<Option<ShowUpdate>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut backoff =
            ReconnectPolicy::new(self.config.backoff_base, self.config.backoff_max);

        loop {
            if *shutdown.borrow() {
                self.set_state(ConnectionState::Disconnected);
                return;
            }

            self.set_state(ConnectionState::Connecting);
            match self.connect().await {
                Ok(mut ws) => {
                    info!(controller = %self.spec.name, url = %self.url, "connected");
                    backoff.reset();
                    self.set_state(ConnectionState::Connected);
                    // Remote state is unknown after a (re)connect; forget
                    // wire history so the next update goes out forced.
                    self.gate.reset();
                    self.wire_pattern = None;

                    match self.serve(&mut ws, &mut updates, &mut shutdown).await {
                        ServeExit::Shutdown => {
                            let _ = ws.close(None).await;
                            self.set_state(ConnectionState::Disconnected);
                            return;
                        }
                        ServeExit::Failed(e) => {
                            warn!(controller = %self.spec.name, error = %e, "connection lost");
                            self.set_state(ConnectionState::Disconnected);
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        controller = %self.spec.name,
                        error = %e,
                        attempt = backoff.attempt_number() + 1,
                        "connect failed"
                    );
                }
            }

            let delay = backoff.next_delay();
            self.set_state(ConnectionState::Backoff);
            debug!(controller = %self.spec.name, ?delay, "backing off");
            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        self.set_state(ConnectionState::Disconnected);
                        return;
                    }
                }
            }
        }
    }

    async fn connect(&self) -> LinkResult<WsStream> {
        let attempt = connect_async(&self.url);
        match timeout(self.config.connect_timeout, attempt).await {
            Ok(Ok((ws, _))) => Ok(ws),
            Ok(Err(e)) => Err(LinkError::ConnectFailed(e.to_string())),
            Err(_) => Err(LinkError::Timeout),
        }
    }

    /// Serve one established connection until it fails or shutdown.
    async fn serve(
        &mut self,
        ws: &mut WsStream,
        updates: &mut watch::Receiver<Option<ShowUpdate>>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> ServeExit {
        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        // Tick loop is gone; treat as shutdown.
                        return ServeExit::Shutdown;
                    }
                    let update = updates.borrow_and_update().clone();
                    let Some(update) = update else { continue };

                    if let Err(e) = self.dispatch(ws, &update).await {
                        return ServeExit::Failed(e);
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return ServeExit::Shutdown;
                    }
                }
                incoming = ws.next() => {
                    match incoming {
                        // Controllers ack frames and stream stats; ignore.
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return ServeExit::Failed(LinkError::SendFailed(e.to_string())),
                        None => return ServeExit::Failed(LinkError::ConnectionClosed),
                    }
                }
            }
        }
    }

    /// Gate one update and put it on the wire; returns whether it was sent.
    ///
    /// The pattern decision compares against what this connection last
    /// sent, not the update's own transition flags: latest-wins delivery
    /// may coalesce the transition tick away, leaving a later update that
    /// carries the new pattern without the flags. A pattern mismatch is
    /// treated as forced.
    async fn dispatch(&mut self, ws: &mut WsStream, update: &ShowUpdate) -> LinkResult<bool> {
        let pattern_pending = self.wire_pattern.as_deref() != Some(update.pattern.as_str());
        let forced = update.forced || pattern_pending;
        let now = Instant::now();
        if !self.gate.should_send(&update.variables, now, forced) {
            return Ok(false);
        }

        if pattern_pending {
            let frame = protocol::encode_set_pattern(&update.pattern)?;
            self.send_frame(ws, frame).await?;
            self.wire_pattern = Some(update.pattern.clone());
            debug!(controller = %self.spec.name, pattern = %update.pattern, "pattern switch");
        }

        let frame = protocol::encode_set_vars(&update.variables)?;
        self.send_frame(ws, frame).await?;
        self.gate.mark_sent(&update.variables, now);
        debug!(
            controller = %self.spec.name,
            label = %update.label,
            forced,
            "variables sent"
        );
        Ok(true)
    }

    async fn send_frame(&self, ws: &mut WsStream, payload: String) -> LinkResult<()> {
        let send = ws.send(Message::Text(payload));
        match timeout(self.config.send_timeout, send).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(LinkError::SendFailed(e.to_string())),
            Err(_) => Err(LinkError::Timeout),
        }
    }
}

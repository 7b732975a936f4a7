// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Connection manager: owns every controller task and the update channel

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use mindshow_core::{DispatchGate, ShowUpdate, ThrottleConfig};

use crate::controller::{ConnectionState, ControllerRuntime, ControllerSpec};

/// Connection-level tunables shared by every controller task.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Port assumed when a controller address has none
    pub default_port: u16,
    /// Bound on websocket connection establishment
    pub connect_timeout: Duration,
    /// Bound on a single frame send (hung-peer detection)
    pub send_timeout: Duration,
    /// First reconnect delay
    pub backoff_base: Duration,
    /// Reconnect delay cap
    pub backoff_max: Duration,
    /// Per-controller dispatch throttle
    pub throttle: ThrottleConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            default_port: 81,
            connect_timeout: Duration::from_secs(5),
            send_timeout: Duration::from_secs(2),
            backoff_base: Duration::from_secs(1),
            backoff_max: Duration::from_secs(15),
            throttle: ThrottleConfig::default(),
        }
    }
}

/// Owns one task per configured controller and fans show updates out to
/// all of them.
///
/// Dropping the manager aborts nothing on its own; call [`shutdown`] for
/// an orderly close (pending frames flushed, websockets closed).
///
/// [`shutdown`]: ConnectionManager::shutdown
pub struct ConnectionManager {
    updates_tx: watch::Sender<Option<ShowUpdate>>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
    statuses: HashMap<String, Arc<RwLock<ConnectionState>>>,
}

impl ConnectionManager {
    /// Spawn one connection task per controller.
    ///
    /// Controllers with unusable addresses are logged and skipped rather
    /// than failing startup; the rest still come up.
    pub fn new(config: LinkConfig, controllers: Vec<ControllerSpec>) -> Self {
        let (updates_tx, _) = watch::channel(None);
        let (shutdown_tx, _) = watch::channel(false);

        let mut tasks = Vec::with_capacity(controllers.len());
        let mut statuses = HashMap::with_capacity(controllers.len());

        for spec in controllers {
            let name = spec.name.clone();
            let state = Arc::new(RwLock::new(ConnectionState::Disconnected));
            let gate = DispatchGate::new(config.throttle.clone());

            let runtime = match ControllerRuntime::new(spec, config.clone(), gate, state.clone()) {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!(controller = %name, error = %e, "controller skipped");
                    continue;
                }
            };

            let updates = updates_tx.subscribe();
            let shutdown = shutdown_tx.subscribe();
            tasks.push(tokio::spawn(runtime.run(updates, shutdown)));
            statuses.insert(name, state);
        }

        info!(controllers = tasks.len(), "connection manager started");
        Self {
            updates_tx,
            shutdown_tx,
            tasks,
            statuses,
        }
    }

    /// Publish a show update to every controller task.
    ///
    /// Latest-wins: a task that has not consumed the previous value only
    /// ever sees the newest one.
    pub fn publish(&self, update: ShowUpdate) {
        self.updates_tx.send_replace(Some(update));
    }

    /// Number of controllers with a live task.
    pub fn controller_count(&self) -> usize {
        self.statuses.len()
    }

    /// Snapshot of every controller's connection state.
    pub fn statuses(&self) -> HashMap<String, ConnectionState> {
        self.statuses
            .iter()
            .map(|(name, state)| (name.clone(), *state.read()))
            .collect()
    }

    /// Signal every task to stop and wait for them to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
        info!("connection manager stopped");
    }
}

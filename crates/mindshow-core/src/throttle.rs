// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Dispatch throttling
//!
//! Anti-flicker rate limiter combining two gates: a minimum interval
//! (protects the link and controller from update storms) and a minimum
//! change magnitude (suppresses updates that would be visually
//! imperceptible). Only one of the two would either flicker from many
//! closely spaced tiny-delta sends, or go visibly stale from batching
//! large changes too infrequently.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::compose::VariableSet;

/// Denominator guard for the relative-change computation.
const EPSILON: f64 = 1e-6;

/// Throttle gate parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Minimum time between non-forced sends
    pub min_interval: Duration,
    /// Minimum max-relative-change across shared keys, e.g. 0.02 = 2%
    pub change_threshold: f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(500),
            change_threshold: 0.02,
        }
    }
}

/// Per-controller send gate tracking what was last put on the wire.
///
/// Each controller owns its own gate so a stalled peer never influences
/// throttling decisions for the others.
#[derive(Debug, Clone)]
pub struct DispatchGate {
    config: ThrottleConfig,
    last_sent: VariableSet,
    last_sent_at: Option<Instant>,
}

impl DispatchGate {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            last_sent: VariableSet::new(),
            last_sent_at: None,
        }
    }

    /// Decide whether `proposed` is worth sending at `now`.
    ///
    /// Forced sends (explicit pattern switch, first update after a
    /// connect) bypass both gates. The very first update through a fresh
    /// gate always passes: there is no remote state to be stale against.
    pub fn should_send(&self, proposed: &VariableSet, now: Instant, forced: bool) -> bool {
        if forced {
            return true;
        }
        let Some(last_at) = self.last_sent_at else {
            return true;
        };

        if now.saturating_duration_since(last_at) < self.config.min_interval {
            return false;
        }
        self.max_relative_change(proposed) >= self.config.change_threshold
    }

    /// Record that the caller actually sent `sent` at `now`.
    pub fn mark_sent(&mut self, sent: &VariableSet, now: Instant) {
        self.last_sent = sent.clone();
        self.last_sent_at = Some(now);
    }

    /// Forget wire state, e.g. after a disconnect. The next decision then
    /// behaves like a first send.
    pub fn reset(&mut self) {
        self.last_sent.clear();
        self.last_sent_at = None;
    }

    /// Largest relative delta across keys; keys the remote has never seen
    /// count as a full change.
    fn max_relative_change(&self, proposed: &VariableSet) -> f64 {
        proposed
            .iter()
            .map(|(key, value)| match self.last_sent.get(key) {
                Some(last) => (value - last).abs() / last.abs().max(EPSILON),
                None => f64::INFINITY,
            })
            .fold(0.0, f64::max)
    }
}

impl Default for DispatchGate {
    fn default() -> Self {
        Self::new(ThrottleConfig::default())
    }
}

// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Reconnection backoff with exponential delay
//!
//! Controllers are retried forever; the delay doubles on every consecutive
//! failure up to a cap and resets to the base after any successful
//! connection.

use std::time::Duration;

/// Exponential backoff policy for one controller connection.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    base: Duration,
    max: Duration,
    attempt: u32,
}

impl ReconnectPolicy {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            attempt: 0,
        }
    }

    /// Delay before the next attempt: base * 2^(attempt), capped.
    pub fn next_delay(&mut self) -> Duration {
        let exp = 2u32.saturating_pow(self.attempt);
        let delay = self.base.saturating_mul(exp).min(self.max);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Reset after a successful connection.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Consecutive failed attempts so far.
    pub fn attempt_number(&self) -> u32 {
        self.attempt
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_growth() {
        let mut policy = ReconnectPolicy::default();
        assert_eq!(policy.next_delay(), Duration::from_secs(1));
        assert_eq!(policy.next_delay(), Duration::from_secs(2));
        assert_eq!(policy.next_delay(), Duration::from_secs(4));
        assert_eq!(policy.next_delay(), Duration::from_secs(8));
    }

    #[test]
    fn test_delay_capped() {
        let mut policy = ReconnectPolicy::default();
        for _ in 0..10 {
            policy.next_delay();
        }
        assert_eq!(policy.next_delay(), Duration::from_secs(15));
    }

    #[test]
    fn test_reset_restarts_at_base() {
        let mut policy = ReconnectPolicy::default();
        policy.next_delay();
        policy.next_delay();
        assert_eq!(policy.attempt_number(), 2);

        policy.reset();
        assert_eq!(policy.attempt_number(), 0);
        assert_eq!(policy.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_never_exhausts() {
        let mut policy = ReconnectPolicy::new(Duration::from_millis(10), Duration::from_millis(100));
        for _ in 0..100 {
            assert!(policy.next_delay() <= Duration::from_millis(100));
        }
    }
}

// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Feature sample intake
//!
//! A feature sample is a timestamped pair of scalar scores produced by the
//! external EEG pipeline at ~10 Hz. The core treats it as a value type and
//! never owns it beyond the instant of processing.

use std::time::Instant;
use tracing::debug;

/// One tick worth of biosignal-derived feature scores, both in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSample {
    pub timestamp: Instant,
    pub attention: f64,
    pub relaxation: f64,
}

impl FeatureSample {
    /// Build a sample, sanitizing malformed scores.
    ///
    /// Out-of-range values, infinities included, clamp to the nearest
    /// valid boundary; NaN has no nearest boundary and falls back to 0.5
    /// (neutral). A momentary clamp is preferable to rejecting the
    /// sample: a dropped tick would stall the mood output, a clamped one
    /// merely saturates it. Out-of-range input is a data-quality signal
    /// from the upstream pipeline, so it is logged, never silently
    /// rescaled.
    pub fn new(timestamp: Instant, attention: f64, relaxation: f64) -> Self {
        Self {
            timestamp,
            attention: sanitize_score("attention", attention),
            relaxation: sanitize_score("relaxation", relaxation),
        }
    }

    /// Sample stamped with the current time.
    pub fn now(attention: f64, relaxation: f64) -> Self {
        Self::new(Instant::now(), attention, relaxation)
    }

    /// Mean of both scores; high when the signal is "awake" on both axes.
    pub fn engagement(&self) -> f64 {
        (self.attention + self.relaxation) / 2.0
    }
}

fn sanitize_score(name: &str, value: f64) -> f64 {
    if value.is_nan() {
        debug!(score = name, "NaN feature score, holding neutral");
        return 0.5;
    }
    if !(0.0..=1.0).contains(&value) {
        debug!(score = name, %value, "feature score out of [0,1], clamping");
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_scores_pass_through() {
        let s = FeatureSample::now(0.8, 0.1);
        assert_eq!(s.attention, 0.8);
        assert_eq!(s.relaxation, 0.1);
    }

    #[test]
    fn test_out_of_range_scores_clamp() {
        let s = FeatureSample::now(1.7, -0.3);
        assert_eq!(s.attention, 1.0);
        assert_eq!(s.relaxation, 0.0);
    }

    #[test]
    fn test_nan_scores_fall_back_to_neutral() {
        let s = FeatureSample::now(f64::NAN, f64::NAN);
        assert_eq!(s.attention, 0.5);
        assert_eq!(s.relaxation, 0.5);
    }

    #[test]
    fn test_infinite_scores_clamp_to_boundary() {
        let s = FeatureSample::now(f64::INFINITY, f64::NEG_INFINITY);
        assert_eq!(s.attention, 1.0);
        assert_eq!(s.relaxation, 0.0);
    }

    #[test]
    fn test_engagement_is_mean_of_scores() {
        let s = FeatureSample::now(0.8, 0.2);
        assert!((s.engagement() - 0.5).abs() < 1e-12);
    }
}

// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Discrete mood classification with hysteresis
//!
//! A single threshold crossing is noisy: a score hovering at the boundary
//! can cross it several times per second. Transitions therefore require
//! sustained evidence on two independent axes - a consecutive-reading
//! confidence count AND a minimum dwell time since the previous
//! transition. Either alone is insufficient; a signal oscillating exactly
//! at threshold can satisfy a reading count every few hundred milliseconds
//! while still flapping.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::sample::FeatureSample;

/// Discrete mood label selecting which base pattern plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    Engaged,
    Relaxed,
    Neutral,
}

impl MoodLabel {
    /// Key used to look the label up in the preset table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Engaged => "engaged",
            Self::Relaxed => "relaxed",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier thresholds and hysteresis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Attention score above this reads as Engaged
    pub attention_threshold: f64,
    /// Relaxation score above this reads as Relaxed (checked after attention)
    pub relaxation_threshold: f64,
    /// Consecutive differing readings required before a transition commits
    pub confidence_required: u32,
    /// Minimum time between committed transitions
    pub min_dwell: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            attention_threshold: 0.75,
            relaxation_threshold: 0.65,
            confidence_required: 3,
            min_dwell: Duration::from_secs(2),
        }
    }
}

/// Hysteresis-based mood classifier.
///
/// Created once at process start and owned exclusively by the tick loop;
/// `classify` mutates it in place every tick.
#[derive(Debug, Clone)]
pub struct StateClassifier {
    config: ClassifierConfig,
    current: MoodLabel,
    candidate: Option<MoodLabel>,
    confidence: u32,
    last_transition: Option<Instant>,
}

impl StateClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            current: MoodLabel::Neutral,
            candidate: None,
            confidence: 0,
            last_transition: None,
        }
    }

    /// The committed label, untouched by pending candidates.
    pub fn current(&self) -> MoodLabel {
        self.current
    }

    /// Consecutive readings accumulated for the pending candidate.
    pub fn confidence(&self) -> u32 {
        self.confidence
    }

    /// Feed one sample and return the (possibly unchanged) committed label.
    pub fn classify(&mut self, sample: &FeatureSample) -> MoodLabel {
        let candidate = self.instantaneous(sample);

        if candidate == self.current {
            // State reaffirmed, no pending change.
            self.candidate = None;
            self.confidence = 0;
            return self.current;
        }

        if self.candidate == Some(candidate) {
            self.confidence += 1;
        } else {
            self.candidate = Some(candidate);
            self.confidence = 1;
        }

        if self.confidence >= self.config.confidence_required
            && self.dwell_elapsed(sample.timestamp)
        {
            info!(from = %self.current, to = %candidate, "mood transition");
            self.current = candidate;
            self.candidate = None;
            self.confidence = 0;
            self.last_transition = Some(sample.timestamp);
        }

        self.current
    }

    /// Instantaneous label for one sample, ignoring hysteresis.
    fn instantaneous(&self, sample: &FeatureSample) -> MoodLabel {
        if sample.attention > self.config.attention_threshold {
            MoodLabel::Engaged
        } else if sample.relaxation > self.config.relaxation_threshold {
            MoodLabel::Relaxed
        } else {
            MoodLabel::Neutral
        }
    }

    fn dwell_elapsed(&self, now: Instant) -> bool {
        match self.last_transition {
            Some(at) => now.saturating_duration_since(at) >= self.config.min_dwell,
            None => true,
        }
    }
}

impl Default for StateClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(base: Instant, ms: u64, attention: f64, relaxation: f64) -> FeatureSample {
        FeatureSample::new(base + Duration::from_millis(ms), attention, relaxation)
    }

    #[test]
    fn test_starts_neutral() {
        let c = StateClassifier::default();
        assert_eq!(c.current(), MoodLabel::Neutral);
    }

    #[test]
    fn test_two_readings_do_not_commit() {
        // 2 of 3 required confirmations, then evidence vanishes.
        let base = Instant::now();
        let mut c = StateClassifier::default();
        c.classify(&sample_at(base, 0, 0.9, 0.1));
        c.classify(&sample_at(base, 100, 0.9, 0.1));
        assert_eq!(c.classify(&sample_at(base, 200, 0.1, 0.1)), MoodLabel::Neutral);
    }

    #[test]
    fn test_three_readings_commit() {
        let base = Instant::now();
        let mut c = StateClassifier::default();
        c.classify(&sample_at(base, 0, 0.9, 0.1));
        c.classify(&sample_at(base, 100, 0.9, 0.1));
        assert_eq!(c.classify(&sample_at(base, 200, 0.9, 0.1)), MoodLabel::Engaged);
    }

    #[test]
    fn test_candidate_change_resets_confidence() {
        let base = Instant::now();
        let mut c = StateClassifier::default();
        c.classify(&sample_at(base, 0, 0.9, 0.1)); // engaged x1
        c.classify(&sample_at(base, 100, 0.9, 0.1)); // engaged x2
        c.classify(&sample_at(base, 200, 0.1, 0.9)); // relaxed x1, engaged run lost
        c.classify(&sample_at(base, 300, 0.9, 0.1)); // engaged x1 again
        assert_eq!(c.classify(&sample_at(base, 400, 0.9, 0.1)), MoodLabel::Neutral);
        assert_eq!(c.classify(&sample_at(base, 500, 0.9, 0.1)), MoodLabel::Engaged);
    }

    #[test]
    fn test_reaffirmation_clears_pending_candidate() {
        let base = Instant::now();
        let mut c = StateClassifier::default();
        c.classify(&sample_at(base, 0, 0.9, 0.1)); // engaged x1
        c.classify(&sample_at(base, 100, 0.9, 0.1)); // engaged x2
        c.classify(&sample_at(base, 200, 0.1, 0.1)); // neutral reaffirmed, counter cleared
        c.classify(&sample_at(base, 300, 0.9, 0.1)); // engaged x1
        c.classify(&sample_at(base, 400, 0.9, 0.1)); // engaged x2
        assert_eq!(c.current(), MoodLabel::Neutral);
    }

    #[test]
    fn test_dwell_blocks_rapid_second_transition() {
        let base = Instant::now();
        let mut c = StateClassifier::default();
        // Commit to Engaged at t=200ms.
        c.classify(&sample_at(base, 0, 0.9, 0.1));
        c.classify(&sample_at(base, 100, 0.9, 0.1));
        assert_eq!(c.classify(&sample_at(base, 200, 0.9, 0.1)), MoodLabel::Engaged);

        // Strong relaxed evidence well inside the 2s dwell window: must hold.
        c.classify(&sample_at(base, 300, 0.1, 0.9));
        c.classify(&sample_at(base, 400, 0.1, 0.9));
        assert_eq!(c.classify(&sample_at(base, 500, 0.1, 0.9)), MoodLabel::Engaged);

        // Once the dwell elapses the sustained candidate commits.
        assert_eq!(c.classify(&sample_at(base, 2300, 0.1, 0.9)), MoodLabel::Relaxed);
    }

    #[test]
    fn test_attention_wins_over_relaxation() {
        let base = Instant::now();
        let mut c = StateClassifier::default();
        for ms in [0u64, 100, 200] {
            c.classify(&sample_at(base, ms, 0.9, 0.9));
        }
        assert_eq!(c.current(), MoodLabel::Engaged);
    }
}

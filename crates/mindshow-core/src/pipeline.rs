// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Tick pipeline
//!
//! One pass of the control chain: sample → classifier + mood mapper →
//! command composer → [`ShowUpdate`]. Owned exclusively by the tick loop;
//! no locking around the frequently mutated classifier/mapper state.

use tracing::debug;

use crate::classifier::{MoodLabel, StateClassifier};
use crate::compose::{PresetTable, VariableSet};
use crate::mood::MoodMapper;
use crate::sample::FeatureSample;

/// The composed target state for all controllers after one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowUpdate {
    /// Committed mood label this tick
    pub label: MoodLabel,
    /// Pattern the controllers should be running
    pub pattern: String,
    /// Whether the label (and therefore the pattern) changed this tick
    pub pattern_changed: bool,
    /// Target variables, mood bias already applied
    pub variables: VariableSet,
    /// Bypass throttling; set on pattern switches
    pub forced: bool,
}

/// Classifier, mood mapper and composer strung together.
pub struct ControlPipeline {
    classifier: StateClassifier,
    mood: MoodMapper,
    presets: PresetTable,
    last_label: MoodLabel,
}

impl ControlPipeline {
    pub fn new(classifier: StateClassifier, mood: MoodMapper, presets: PresetTable) -> Self {
        let last_label = classifier.current();
        Self {
            classifier,
            mood,
            presets,
            last_label,
        }
    }

    /// Process one feature sample into a composed update.
    ///
    /// Infallible by design: malformed input was already sanitized at
    /// sample construction and composition fails closed, so a bad tick can
    /// never stop mood computation.
    pub fn tick(&mut self, sample: FeatureSample) -> ShowUpdate {
        let label = self.classifier.classify(&sample);
        let smoothed = self.mood.update(&sample);

        let pattern_changed = label != self.last_label;
        self.last_label = label;

        let (pattern, variables) = self.presets.compose(label, smoothed);
        debug!(
            %label,
            mood = format_args!("{smoothed:.3}"),
            attention = format_args!("{:.3}", sample.attention),
            relaxation = format_args!("{:.3}", sample.relaxation),
            "tick"
        );

        ShowUpdate {
            label,
            pattern,
            pattern_changed,
            variables,
            forced: pattern_changed,
        }
    }

    /// Current smoothed mood value.
    pub fn mood(&self) -> f64 {
        self.mood.smoothed()
    }

    /// Current committed label.
    pub fn label(&self) -> MoodLabel {
        self.classifier.current()
    }
}

impl Default for ControlPipeline {
    fn default() -> Self {
        Self::new(
            StateClassifier::default(),
            MoodMapper::default(),
            PresetTable::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn run(pipeline: &mut ControlPipeline, base: Instant, ms: u64, a: f64, r: f64) -> ShowUpdate {
        pipeline.tick(FeatureSample::new(base + Duration::from_millis(ms), a, r))
    }

    #[test]
    fn test_steady_neutral_never_forces() {
        let base = Instant::now();
        let mut p = ControlPipeline::default();
        for i in 0..10 {
            let update = run(&mut p, base, i * 100, 0.5, 0.5);
            assert_eq!(update.label, MoodLabel::Neutral);
            assert!(!update.pattern_changed);
            assert!(!update.forced);
        }
    }

    #[test]
    fn test_label_transition_forces_exactly_once() {
        let base = Instant::now();
        let mut p = ControlPipeline::default();
        run(&mut p, base, 0, 0.9, 0.1);
        run(&mut p, base, 100, 0.9, 0.1);
        let commit = run(&mut p, base, 200, 0.9, 0.1);
        assert_eq!(commit.label, MoodLabel::Engaged);
        assert!(commit.pattern_changed);
        assert!(commit.forced);

        let next = run(&mut p, base, 300, 0.9, 0.1);
        assert!(!next.pattern_changed);
        assert!(!next.forced);
    }

    #[test]
    fn test_mood_keeps_moving_while_label_holds() {
        let base = Instant::now();
        let mut p = ControlPipeline::default();
        let first = run(&mut p, base, 0, 0.4, 0.6);
        let second = run(&mut p, base, 100, 0.4, 0.6);
        assert_eq!(first.label, second.label);
        assert_ne!(
            first.variables["colorMoodBias"],
            second.variables["colorMoodBias"]
        );
    }

    #[test]
    fn test_end_to_end_engaged_and_warm() {
        // attention=0.8, relaxation=0.1 at 100ms spacing with defaults:
        // Engaged after 3 ticks, smoothed mood trending warm (< 0.5).
        let base = Instant::now();
        let mut p = ControlPipeline::default();
        let mut last = run(&mut p, base, 0, 0.8, 0.1);
        last = run(&mut p, base, 100, 0.8, 0.1);
        assert_eq!(last.label, MoodLabel::Neutral);
        last = run(&mut p, base, 200, 0.8, 0.1);
        assert_eq!(last.label, MoodLabel::Engaged);
        assert_eq!(last.pattern, "sparkfire");
        assert!(p.mood() < 0.5);

        // Asymptotically approaches the eased value for that input.
        let mut prev = p.mood();
        for i in 3..60 {
            run(&mut p, base, i * 100, 0.8, 0.1);
            assert!(p.mood() <= prev + 1e-9);
            prev = p.mood();
        }
    }
}

// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end control loop behavior through the public API.

use std::time::{Duration, Instant};

use mindshow_core::{
    ClassifierConfig, ControlPipeline, FeatureSample, MoodLabel, MoodMapper, PresetTable,
    StateClassifier,
};

fn pipeline_with(classifier: ClassifierConfig) -> ControlPipeline {
    ControlPipeline::new(
        StateClassifier::new(classifier),
        MoodMapper::default(),
        PresetTable::default(),
    )
}

fn feed(p: &mut ControlPipeline, base: Instant, ms: u64, attention: f64, relaxation: f64) -> mindshow_core::ShowUpdate {
    p.tick(FeatureSample::new(
        base + Duration::from_millis(ms),
        attention,
        relaxation,
    ))
}

#[test]
fn sustained_attention_commits_engaged_and_switches_pattern() {
    let base = Instant::now();
    let mut p = ControlPipeline::default();

    // Two high readings are not enough evidence.
    assert_eq!(feed(&mut p, base, 0, 0.9, 0.1).label, MoodLabel::Neutral);
    assert_eq!(feed(&mut p, base, 100, 0.9, 0.1).label, MoodLabel::Neutral);

    let commit = feed(&mut p, base, 200, 0.9, 0.1);
    assert_eq!(commit.label, MoodLabel::Engaged);
    assert_eq!(commit.pattern, "sparkfire");
    assert!(commit.pattern_changed);
    assert!(commit.forced);
}

#[test]
fn interrupted_streak_does_not_commit() {
    let base = Instant::now();
    let mut p = ControlPipeline::default();

    feed(&mut p, base, 0, 0.9, 0.1);
    feed(&mut p, base, 100, 0.9, 0.1);
    // One neutral reading resets the streak.
    feed(&mut p, base, 200, 0.5, 0.5);
    let after = feed(&mut p, base, 300, 0.9, 0.1);
    assert_eq!(after.label, MoodLabel::Neutral);
}

#[test]
fn dwell_time_blocks_rapid_flapping() {
    let base = Instant::now();
    let mut p = pipeline_with(ClassifierConfig {
        min_dwell: Duration::from_secs(2),
        ..ClassifierConfig::default()
    });

    for i in 0..3 {
        feed(&mut p, base, i * 100, 0.9, 0.1);
    }
    assert_eq!(p.label(), MoodLabel::Engaged);

    // Immediately reverse: evidence accumulates but the dwell window
    // since the Engaged commit holds the label.
    for i in 3..8 {
        feed(&mut p, base, i * 100, 0.2, 0.9);
    }
    assert_eq!(p.label(), MoodLabel::Engaged);

    // Past the dwell window the pending candidate commits.
    let update = feed(&mut p, base, 2300, 0.2, 0.9);
    assert_eq!(update.label, MoodLabel::Relaxed);
    assert_eq!(update.pattern, "slow waves");
}

#[test]
fn mood_bias_tracks_signal_while_label_is_stable() {
    let base = Instant::now();
    let mut p = ControlPipeline::default();

    // Relaxation rises but stays below the Relaxed threshold, so the
    // label never moves while the continuous value does.
    let mut last_bias = feed(&mut p, base, 0, 0.5, 0.5).variables["colorMoodBias"];
    for i in 1..20 {
        let update = feed(&mut p, base, i * 100, 0.5, 0.6);
        assert_eq!(update.label, MoodLabel::Neutral);
        assert!(update.variables["colorMoodBias"] >= last_bias);
        last_bias = update.variables["colorMoodBias"];
    }
    // Relaxation above midpoint pushes the value cool.
    assert!(last_bias > 0.5);
}

#[test]
fn garbage_input_degrades_to_neutral_midpoint() {
    let base = Instant::now();
    let mut p = ControlPipeline::default();

    let update = feed(&mut p, base, 0, f64::NAN, f64::INFINITY);
    assert_eq!(update.label, MoodLabel::Neutral);
    assert!(update.variables["colorMoodBias"].is_finite());
}

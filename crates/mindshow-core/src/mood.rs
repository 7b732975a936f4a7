// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Continuous color-mood mapping
//!
//! Produces a [0, 1] scalar biasing perceived color temperature: attention
//! pulls the value down (warm), relaxation pulls it up (cool). The output
//! is never discrete and is smoothed every tick regardless of what the
//! classifier decides - the classifier picks *what pattern plays* and must
//! not flap, this picks *what tint is applied* and must feel alive.

use serde::{Deserialize, Serialize};

use crate::sample::FeatureSample;

/// Mood mapping weights and smoothing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodConfig {
    /// How strongly attention shifts the value warm (downward)
    pub attention_weight: f64,
    /// How strongly relaxation shifts the value cool (upward)
    pub relaxation_weight: f64,
    /// Color shift intensity at zero engagement
    pub intensity_base: f64,
    /// Additional intensity per unit of engagement
    pub intensity_scale: f64,
    /// Exponential moving average factor, (0, 1]
    pub smoothing: f64,
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            attention_weight: 0.4,
            relaxation_weight: 0.4,
            intensity_base: 0.5,
            intensity_scale: 0.5,
            smoothing: 0.3,
        }
    }
}

/// Temporally smoothed color-mood state.
///
/// Initialized at the neutral midpoint and never reset for the process
/// lifetime; only the smoothed value is externally visible.
#[derive(Debug, Clone)]
pub struct MoodMapper {
    config: MoodConfig,
    raw: f64,
    eased: f64,
    smoothed: f64,
}

impl MoodMapper {
    pub fn new(config: MoodConfig) -> Self {
        Self {
            config,
            raw: 0.5,
            eased: 0.5,
            smoothed: 0.5,
        }
    }

    /// The externally visible output, updated by [`MoodMapper::update`].
    pub fn smoothed(&self) -> f64 {
        self.smoothed
    }

    /// Pre-smoothing eased value from the most recent tick.
    pub fn eased(&self) -> f64 {
        self.eased
    }

    /// Pre-easing raw value from the most recent tick.
    pub fn raw(&self) -> f64 {
        self.raw
    }

    /// Feed one sample and return the new smoothed mood value.
    pub fn update(&mut self, sample: &FeatureSample) -> f64 {
        let attn_contribution = (sample.attention - 0.5) * -self.config.attention_weight;
        let relax_contribution = (sample.relaxation - 0.5) * self.config.relaxation_weight;

        // An awake signal (high on both axes) shifts color harder than a
        // flat low-signal baseline.
        let intensity = self.config.intensity_base + sample.engagement() * self.config.intensity_scale;

        self.raw = (0.5 + (attn_contribution + relax_contribution) * intensity).clamp(0.0, 1.0);
        self.eased = ease(self.raw);

        let alpha = self.config.smoothing;
        self.smoothed = alpha * self.eased + (1.0 - alpha) * self.smoothed;
        self.smoothed
    }
}

impl Default for MoodMapper {
    fn default() -> Self {
        Self::new(MoodConfig::default())
    }
}

/// Quadratic S-curve so the mapping does not feel linear near the extremes.
fn ease(raw: f64) -> f64 {
    if raw < 0.5 {
        0.5 * (raw * 2.0).powi(2)
    } else {
        1.0 - 0.5 * ((1.0 - raw) * 2.0).powi(2)
    }
}

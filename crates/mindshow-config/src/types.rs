// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `mindshow.toml`. Every section is optional; the defaults reproduce the
//! documented control-loop constants.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MindshowConfig {
    pub system: SystemConfig,
    pub classifier: ClassifierSection,
    pub mood: MoodSection,
    pub throttle: ThrottleSection,
    pub link: LinkSection,
    pub controllers: Vec<ControllerSection>,
    pub presets: PresetsSection,
}

/// System-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Tick loop cadence in Hz; also the rate the feature source is sampled
    pub update_rate_hz: f64,
    pub log_level: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            update_rate_hz: 10.0,
            log_level: "info".to_string(),
        }
    }
}

/// State classifier thresholds and hysteresis
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierSection {
    pub attention_threshold: f64,
    pub relaxation_threshold: f64,
    /// Consecutive differing readings required before a transition commits
    pub confidence_required: u32,
    /// Minimum seconds between committed transitions
    pub min_dwell_secs: f64,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            attention_threshold: 0.75,
            relaxation_threshold: 0.65,
            confidence_required: 3,
            min_dwell_secs: 2.0,
        }
    }
}

/// Continuous color-mood mapping weights
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MoodSection {
    pub attention_weight: f64,
    pub relaxation_weight: f64,
    pub intensity_base: f64,
    pub intensity_scale: f64,
    /// Exponential moving average factor, (0, 1]
    pub smoothing: f64,
}

impl Default for MoodSection {
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

/// Dispatch throttling gates
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThrottleSection {
    /// Minimum milliseconds between non-forced sends per controller
    pub min_interval_ms: u64,
    /// Minimum relative change across variables, e.g. 0.02 = 2%
    pub change_threshold: f64,
}

impl Default for ThrottleSection {
    fn default() -> Self {
        Self {
            min_interval_ms: 500,
            change_threshold: 0.02,
        }
    }
}

/// Controller link settings shared by all connections
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LinkSection {
    /// Port assumed when a controller address omits one
    pub default_port: u16,
    pub connect_timeout_ms: u64,
    pub send_timeout_ms: u64,
    /// First reconnect delay; doubles on every consecutive failure
    pub backoff_base_ms: u64,
    /// Reconnect delay cap
    pub backoff_max_ms: u64,
}

impl Default for LinkSection {
    fn default() -> Self {
        Self {
            default_port: 81,
            connect_timeout_ms: 5000,
            send_timeout_ms: 2000,
            backoff_base_ms: 1000,
            backoff_max_ms: 15000,
        }
    }
}

/// One lighting controller endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerSection {
    pub name: String,
    /// Host, host:port, or full ws:// URL
    pub address: String,
}

/// Label → preset table plus the hue-bias variable name
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PresetsSection {
    /// Variable key carrying the continuous mood value
    pub mood_bias_key: String,
    pub engaged: PresetSection,
    pub relaxed: PresetSection,
    pub neutral: PresetSection,
}

impl Default for PresetsSection {
    fn default() -> Self {
        Self {
            mood_bias_key: "colorMoodBias".to_string(),
            engaged: PresetSection::new(
                "sparkfire",
                &[("hue", 0.0), ("brightness", 0.9), ("speed", 0.8), ("colorMoodBias", 0.2)],
            ),
            relaxed: PresetSection::new(
                "slow waves",
                &[("hue", 0.67), ("brightness", 0.5), ("speed", 0.3), ("colorMoodBias", 0.8)],
            ),
            neutral: PresetSection::new(
                "rainbow",
                &[("hue", 0.33), ("brightness", 0.7), ("speed", 0.5), ("colorMoodBias", 0.5)],
            ),
        }
    }
}

/// Base pattern and variables for one mood label
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PresetSection {
    pub pattern: String,
    pub variables: BTreeMap<String, f64>,
}

impl PresetSection {
    fn new(pattern: &str, variables: &[(&str, f64)]) -> Self {
        Self {
            pattern: pattern.to_string(),
            variables: variables.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }
}

impl PresetsSection {
    /// All presets with their label keys, for validation sweeps
    pub fn all(&self) -> [(&str, &PresetSection); 3] {
        [
            ("engaged", &self.engaged),
            ("relaxed", &self.relaxed),
            ("neutral", &self.neutral),
        ]
    }
}

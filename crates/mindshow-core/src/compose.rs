// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Command composition
//!
//! Combines the discrete mood label (base pattern + variable preset) with
//! the continuous mood value (hue bias) into the target variable set for a
//! controller. Pure lookup and merge, no side effects.

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classifier::MoodLabel;

/// Ordered variable map; deterministic iteration keeps wire frames stable.
pub type VariableSet = BTreeMap<String, f64>;

/// A base pattern plus its static variable values for one mood label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Pattern/program identifier understood by the controller
    pub pattern: String,
    /// Base variable values exported to the pattern
    pub variables: VariableSet,
}

/// Static label → preset table, read-only after startup.
#[derive(Debug, Clone)]
pub struct PresetTable {
    presets: HashMap<MoodLabel, Preset>,
    mood_bias_key: String,
}

impl PresetTable {
    /// Build a table from configured presets.
    ///
    /// Presets with non-finite variable values fail closed: the offending
    /// entry is dropped and the label falls back to the neutral preset at
    /// composition time. A missing neutral preset falls back to the
    /// built-in default.
    pub fn new(presets: HashMap<MoodLabel, Preset>, mood_bias_key: impl Into<String>) -> Self {
        let presets = presets
            .into_iter()
            .filter(|(label, preset)| {
                let ok = preset.variables.values().all(|v| v.is_finite());
                if !ok {
                    warn!(%label, "preset has non-finite variables, falling back to neutral");
                }
                ok
            })
            .collect();
        Self {
            presets,
            mood_bias_key: mood_bias_key.into(),
        }
    }

    /// Variable key carrying the continuous mood value.
    pub fn mood_bias_key(&self) -> &str {
        &self.mood_bias_key
    }

    /// Compose the target pattern and variable set for one label.
    ///
    /// The smoothed mood value overrides the preset's static hue bias, so
    /// color temperature keeps moving even while the label holds steady.
    pub fn compose(&self, label: MoodLabel, smoothed_mood: f64) -> (String, VariableSet) {
        let preset = match self.presets.get(&label) {
            Some(preset) => preset.clone(),
            None => {
                warn!(%label, "no preset configured, failing closed to neutral");
                self.presets
                    .get(&MoodLabel::Neutral)
                    .cloned()
                    .unwrap_or_else(neutral_preset)
            }
        };

        let mut variables = preset.variables;
        variables.insert(self.mood_bias_key.clone(), smoothed_mood.clamp(0.0, 1.0));
        (preset.pattern, variables)
    }
}

impl Default for PresetTable {
    /// The default show: high-energy fire when engaged, slow blue waves
    /// when relaxed, a balanced rainbow otherwise.
    fn default() -> Self {
        let mut presets = HashMap::new();
        presets.insert(
            MoodLabel::Engaged,
            preset("sparkfire", &[("hue", 0.0), ("brightness", 0.9), ("speed", 0.8), ("colorMoodBias", 0.2)]),
        );
        presets.insert(
            MoodLabel::Relaxed,
            preset("slow waves", &[("hue", 0.67), ("brightness", 0.5), ("speed", 0.3), ("colorMoodBias", 0.8)]),
        );
        presets.insert(MoodLabel::Neutral, neutral_preset());
        Self::new(presets, "colorMoodBias")
    }
}

fn preset(pattern: &str, variables: &[(&str, f64)]) -> Preset {
    Preset {
        pattern: pattern.to_string(),
        variables: variables.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
    }
}

fn neutral_preset() -> Preset {
    preset("rainbow", &[("hue", 0.33), ("brightness", 0.7), ("speed", 0.5), ("colorMoodBias", 0.5)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_overrides_mood_bias() {
        let table = PresetTable::default();
        let (pattern, vars) = table.compose(MoodLabel::Engaged, 0.123);
        assert_eq!(pattern, "sparkfire");
        assert_eq!(vars["colorMoodBias"], 0.123);
        assert_eq!(vars["brightness"], 0.9);
    }

    #[test]
    fn test_compose_is_idempotent() {
        let table = PresetTable::default();
        let first = table.compose(MoodLabel::Relaxed, 0.7);
        let second = table.compose(MoodLabel::Relaxed, 0.7);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_preset_fails_closed_to_neutral() {
        let table = PresetTable::new(HashMap::new(), "colorMoodBias");
        let (pattern, vars) = table.compose(MoodLabel::Engaged, 0.5);
        assert_eq!(pattern, "rainbow");
        assert_eq!(vars["hue"], 0.33);
    }

    #[test]
    fn test_non_finite_preset_dropped() {
        let mut presets = HashMap::new();
        presets.insert(
            MoodLabel::Engaged,
            preset("broken", &[("hue", f64::NAN)]),
        );
        presets.insert(MoodLabel::Neutral, neutral_preset());
        let table = PresetTable::new(presets, "colorMoodBias");
        let (pattern, _) = table.compose(MoodLabel::Engaged, 0.5);
        assert_eq!(pattern, "rainbow");
    }

    #[test]
    fn test_mood_value_clamped_into_unit_interval() {
        let table = PresetTable::default();
        let (_, vars) = table.compose(MoodLabel::Neutral, 1.5);
        assert_eq!(vars["colorMoodBias"], 1.0);
    }
}

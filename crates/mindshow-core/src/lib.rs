// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! # mindshow-core
//!
//! The control loop between raw biosignal feature scores and lighting
//! controller actuation. Pure logic, no I/O:
//!
//! - [`StateClassifier`]: hysteresis-based discrete mood labeling
//! - [`MoodMapper`]: continuous, perceptually-eased color-mood value
//! - [`PresetTable`]: label + mood value → controller variable set
//! - [`DispatchGate`]: change/interval-gated send decision per controller
//! - [`ControlPipeline`]: one tick of the whole chain
//!
//! The classifier deliberately resists change (pattern selection must not
//! flap); the mood mapper deliberately never resists (color tint must feel
//! alive). Both consume the same [`FeatureSample`] each tick.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod classifier;
pub mod compose;
pub mod mood;
pub mod pipeline;
pub mod sample;
pub mod throttle;

pub use classifier::{ClassifierConfig, MoodLabel, StateClassifier};
pub use compose::{Preset, PresetTable, VariableSet};
pub use mood::{MoodConfig, MoodMapper};
pub use pipeline::{ControlPipeline, ShowUpdate};
pub use sample::FeatureSample;
pub use throttle::{DispatchGate, ThrottleConfig};

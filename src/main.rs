// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! MindShow daemon
//!
//! Reads attention/relaxation feature scores from stdin, runs the control
//! loop at a fixed cadence, and drives every configured lighting
//! controller over its own websocket.

mod source;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use mindshow_config::{load_config, validate_config, MindshowConfig};
use mindshow_core::{
    ClassifierConfig, ControlPipeline, MoodConfig, MoodLabel, MoodMapper, Preset, PresetTable,
    StateClassifier, ThrottleConfig,
};
use mindshow_link::{ConnectionManager, ControllerSpec, LinkConfig};

use source::FeatureSource;

/// MindShow - biosignal-driven lighting control
#[derive(Parser, Debug)]
#[command(name = "mindshow", version, about, long_about = None)]
struct Args {
    /// Path to mindshow.toml (default: search cwd and ancestors)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("loading configuration")?;
    validate_config(&config).context("validating configuration")?;

    init_tracing(args.log_level.as_deref().unwrap_or(&config.system.log_level));
    info!(version = env!("CARGO_PKG_VERSION"), "mindshow starting");

    if config.controllers.is_empty() {
        warn!("no controllers configured; running the loop without outputs");
    }

    let mut pipeline = build_pipeline(&config);
    let manager = ConnectionManager::new(build_link_config(&config), build_controllers(&config));
    let source = FeatureSource::spawn_stdin();

    let tick = Duration::from_secs_f64(1.0 / config.system.update_rate_hz);
    info!(
        rate_hz = config.system.update_rate_hz,
        controllers = manager.controller_count(),
        "control loop running"
    );

    run_loop(&mut pipeline, &manager, &source, tick).await;

    info!("shutting down");
    manager.shutdown().await;
    Ok(())
}

/// Tick until Ctrl+C.
async fn run_loop(
    pipeline: &mut ControlPipeline,
    manager: &ConnectionManager,
    source: &FeatureSource,
    tick: Duration,
) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Hold the last known reading across stream pauses; until
                // the first one arrives there is nothing to drive.
                let Some(reading) = source.latest() else {
                    debug!("no feature reading yet");
                    continue;
                };
                let sample = mindshow_core::FeatureSample::now(reading.attention, reading.relaxation);
                let update = pipeline.tick(sample);
                manager.publish(update);
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "signal handler failed, stopping");
                }
                return;
            }
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mindshow={level},warn")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_pipeline(config: &MindshowConfig) -> ControlPipeline {
    let classifier = StateClassifier::new(ClassifierConfig {
        attention_threshold: config.classifier.attention_threshold,
        relaxation_threshold: config.classifier.relaxation_threshold,
        confidence_required: config.classifier.confidence_required,
        min_dwell: Duration::from_secs_f64(config.classifier.min_dwell_secs),
    });
    let mood = MoodMapper::new(MoodConfig {
        attention_weight: config.mood.attention_weight,
        relaxation_weight: config.mood.relaxation_weight,
        intensity_base: config.mood.intensity_base,
        intensity_scale: config.mood.intensity_scale,
        smoothing: config.mood.smoothing,
    });

    let mut presets = HashMap::new();
    for (label, section) in [
        (MoodLabel::Engaged, &config.presets.engaged),
        (MoodLabel::Relaxed, &config.presets.relaxed),
        (MoodLabel::Neutral, &config.presets.neutral),
    ] {
        presets.insert(
            label,
            Preset {
                pattern: section.pattern.clone(),
                variables: section.variables.clone(),
            },
        );
    }
    let table = PresetTable::new(presets, config.presets.mood_bias_key.clone());

    ControlPipeline::new(classifier, mood, table)
}

fn build_link_config(config: &MindshowConfig) -> LinkConfig {
    LinkConfig {
        default_port: config.link.default_port,
        connect_timeout: Duration::from_millis(config.link.connect_timeout_ms),
        send_timeout: Duration::from_millis(config.link.send_timeout_ms),
        backoff_base: Duration::from_millis(config.link.backoff_base_ms),
        backoff_max: Duration::from_millis(config.link.backoff_max_ms),
        throttle: ThrottleConfig {
            min_interval: Duration::from_millis(config.throttle.min_interval_ms),
            change_threshold: config.throttle.change_threshold,
        },
    }
}

fn build_controllers(config: &MindshowConfig) -> Vec<ControllerSpec> {
    config
        .controllers
        .iter()
        .map(|c| ControllerSpec::new(c.name.clone(), c.address.clone()))
        .collect()
}

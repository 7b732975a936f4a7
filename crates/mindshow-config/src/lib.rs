// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! # MindShow Configuration System
//!
//! Type-safe configuration loader for the MindShow control loop:
//! - TOML file parsing with full defaults (an empty file is a valid config)
//! - Environment variable overrides
//! - Startup validation reporting every violation at once
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mindshow_config::{load_config, validate_config};
//!
//! let config = load_config(None).expect("failed to load config");
//! validate_config(&config).expect("invalid config");
//! println!("update rate: {} Hz", config.system.update_rate_hz);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation failed:\n{0}")]
    ValidationError(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

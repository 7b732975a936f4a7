// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Two-tier loading: the TOML file supplies base values, environment
//! variables apply runtime overrides on top.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ConfigError, ConfigResult, MindshowConfig};

const CONFIG_FILE_NAME: &str = "mindshow.toml";

/// Find the MindShow configuration file
///
/// Search order:
/// 1. `MINDSHOW_CONFIG_PATH` environment variable
/// 2. Current working directory: `./mindshow.toml`
/// 3. Ancestor directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file exists in any
/// searched location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("MINDSHOW_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by MINDSHOW_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd;
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent.to_path_buf();
                }
                None => break,
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{CONFIG_FILE_NAME}' not found in any of these locations:\n{search_list}\n\nSet MINDSHOW_CONFIG_PATH to specify a custom location."
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, searches the
///   standard locations; a missing file then yields the built-in defaults
///   (the whole config surface has defaults).
///
/// # Errors
///
/// Returns an error if an explicitly named file is missing or if any file
/// contains invalid TOML
pub fn load_config(config_path: Option<&Path>) -> ConfigResult<MindshowConfig> {
    let mut config = match config_path {
        Some(path) => parse_file(path)?,
        None => match find_config_file() {
            Ok(path) => parse_file(&path)?,
            Err(ConfigError::FileNotFound(_)) => MindshowConfig::default(),
            Err(e) => return Err(e),
        },
    };

    apply_environment_overrides(&mut config);
    Ok(config)
}

fn parse_file(path: &Path) -> ConfigResult<MindshowConfig> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `MINDSHOW_LOG_LEVEL` -> `system.log_level`
/// - `MINDSHOW_UPDATE_RATE_HZ` -> `system.update_rate_hz`
/// - `MINDSHOW_CONTROLLER` -> replaces the controller list with a single
///   entry named `env` at the given address
pub fn apply_environment_overrides(config: &mut MindshowConfig) {
    if let Ok(value) = env::var("MINDSHOW_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("MINDSHOW_UPDATE_RATE_HZ") {
        if let Ok(rate) = value.parse::<f64>() {
            config.system.update_rate_hz = rate;
        }
    }
    if let Ok(value) = env::var("MINDSHOW_CONTROLLER") {
        config.controllers = vec![crate::ControllerSection {
            name: "env".to_string(),
            address: value,
        }];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        File::create(&config_path).unwrap();

        env::set_var("MINDSHOW_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("MINDSHOW_CONFIG_PATH");

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_load_explicit_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("mindshow.toml");

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[system]").unwrap();
        writeln!(file, "update_rate_hz = 20.0").unwrap();
        writeln!(file, "[throttle]").unwrap();
        writeln!(file, "min_interval_ms = 250").unwrap();

        let config = load_config(Some(&config_path)).unwrap();
        assert_eq!(config.system.update_rate_hz, 20.0);
        assert_eq!(config.throttle.min_interval_ms, 250);
        // Untouched sections keep their defaults.
        assert_eq!(config.classifier.confidence_required, 3);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = load_config(Some(Path::new("/nonexistent/mindshow.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_fails() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("mindshow.toml");
        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "not valid toml [[").unwrap();

        assert!(matches!(
            load_config(Some(&config_path)),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = MindshowConfig::default();

        env::set_var("MINDSHOW_LOG_LEVEL", "debug");
        env::set_var("MINDSHOW_CONTROLLER", "192.168.0.241:81");
        apply_environment_overrides(&mut config);
        env::remove_var("MINDSHOW_LOG_LEVEL");
        env::remove_var("MINDSHOW_CONTROLLER");

        assert_eq!(config.system.log_level, "debug");
        assert_eq!(config.controllers.len(), 1);
        assert_eq!(config.controllers[0].address, "192.168.0.241:81");
    }
}

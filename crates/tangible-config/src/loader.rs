// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, DashboardConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "tangible_dashboard.toml";

/// Find the dashboard configuration file
///
/// Search order:
/// 1. `TANGIBLE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./tangible_dashboard.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("TANGIBLE_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by TANGIBLE_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
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
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet TANGIBLE_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Validation is a separate step, see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<DashboardConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: DashboardConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `TANGIBLE_BROKER_ADDRESS` -> `broker.address`
/// - `TANGIBLE_LOG_LEVEL` -> `system.log_level`
/// - `TANGIBLE_LOG_DIR` -> `system.log_dir`
/// - `TANGIBLE_LIGHT_DEVICE` -> `light_controller.device_path`
/// - `TANGIBLE_SEND_INTERVAL_MS` -> `light_controller.min_send_interval_ms`
/// - `TANGIBLE_BAUD_RATE` -> `light_controller.baud_rate`
/// - `TANGIBLE_PROXY_IDS` -> `proxies.ids` (comma-separated)
pub fn apply_environment_overrides(config: &mut DashboardConfig) -> ConfigResult<()> {
    let overrides: HashMap<String, String> = [
        ("TANGIBLE_BROKER_ADDRESS", "broker_address"),
        ("TANGIBLE_LOG_LEVEL", "log_level"),
        ("TANGIBLE_LOG_DIR", "log_dir"),
        ("TANGIBLE_LIGHT_DEVICE", "device_path"),
        ("TANGIBLE_SEND_INTERVAL_MS", "min_send_interval_ms"),
        ("TANGIBLE_BAUD_RATE", "baud_rate"),
        ("TANGIBLE_PROXY_IDS", "proxy_ids"),
    ]
    .into_iter()
    .filter_map(|(var, key)| env::var(var).ok().map(|value| (key.to_string(), value)))
    .collect();

    apply_overrides(config, &overrides)
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"broker_address": "tcp://10.0.0.2:5556"}`)
///
/// Recognised keys: `broker_address`, `log_level`, `log_dir`, `device_path`,
/// `baud_rate`, `min_send_interval_ms`, `proxy_ids`.
pub fn apply_cli_overrides(
    config: &mut DashboardConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    apply_overrides(config, cli_args)
}

fn apply_overrides(
    config: &mut DashboardConfig,
    overrides: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = overrides.get("broker_address") {
        config.broker.address = value.clone();
    }
    if let Some(value) = overrides.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = overrides.get("log_dir") {
        config.system.log_dir = PathBuf::from(value);
    }
    if let Some(value) = overrides.get("device_path") {
        config.light_controller.device_path = PathBuf::from(value);
    }
    if let Some(value) = overrides.get("min_send_interval_ms") {
        config.light_controller.min_send_interval_ms = value.trim().parse().map_err(|_| {
            ConfigError::InvalidValue(format!("min_send_interval_ms: '{}' is not a number", value))
        })?;
    }
    if let Some(value) = overrides.get("baud_rate") {
        config.light_controller.baud_rate = value.trim().parse().map_err(|_| {
            ConfigError::InvalidValue(format!("baud_rate: '{}' is not a number", value))
        })?;
    }
    if let Some(value) = overrides.get("proxy_ids") {
        config.proxies.ids = parse_id_list(value)?;
    }
    Ok(())
}

fn parse_id_list(value: &str) -> ConfigResult<Vec<u32>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>().map_err(|_| {
                ConfigError::InvalidValue(format!("proxy_ids: '{}' is not a proxy id", part))
            })
        })
        .collect()
}

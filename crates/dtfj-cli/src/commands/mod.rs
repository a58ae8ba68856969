//! Command handlers for the `dtfj` binary.
//!
//! Shared config loading lives here; each subcommand has its own module.

pub mod compare;
pub mod deadlock;
pub mod members;

use anyhow::Result;
use dtfj_config::{report_unused_keys, ConfigUse, LoadedConfig, UnusedKeyPolicy};
use std::path::PathBuf;
use tracing::{info, warn};

/// Loads the layered config for one command and applies the unused-key
/// guard. No paths yields the empty config.
pub fn load_config(
    paths: &[PathBuf],
    used_by: ConfigUse,
    strict: bool,
) -> Result<LoadedConfig> {
    let loaded = if paths.is_empty() {
        LoadedConfig::empty()?
    } else {
        dtfj_config::load_layered_yaml(paths)?
    };

    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(used_by, &loaded.config_json, policy)?;
    for pointer in &report.unused_leaf_pointers {
        warn!(used_by = report.used_by.as_str(), %pointer, "config key is not read by this command");
    }
    info!(config_hash = %loaded.config_hash, layers = paths.len(), "config loaded");
    Ok(loaded)
}

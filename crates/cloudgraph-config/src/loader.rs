// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup: `./cloudgraph.toml` > `<config_dir>/cloudgraph/cloudgraph.toml`,
//! with environment variable overrides via the `CLOUDGRAPH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CloudGraphConfig;

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "cloudgraph.toml";

/// Keys of the `[cloud_graph]` section that may be set from the environment.
const ENV_KEYS: &[&str] = &[
    "storage_host",
    "data_dir",
    "config_dir",
    "log_level",
    "dev_mode",
    "default_namespace",
    "connection_merge",
];

/// Path of the per-user config file, if the platform has a config directory.
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cloudgraph").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `<config_dir>/cloudgraph/cloudgraph.toml`
/// 3. `./cloudgraph.toml`
/// 4. `CLOUDGRAPH_*` environment variables
pub fn load_config() -> Result<CloudGraphConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<CloudGraphConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CloudGraphConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CloudGraphConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CloudGraphConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CloudGraphConfig::default()))
        .merge(Toml::file(user_config_file().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `CLOUDGRAPH_<KEY>` to `cloud_graph.<key>`.
///
/// Only known keys are accepted so stray `CLOUDGRAPH_*` variables do not trip
/// `deny_unknown_fields` at the top level.
fn env_provider() -> Env {
    Env::prefixed("CLOUDGRAPH_")
        .filter(|key| ENV_KEYS.iter().any(|known| key.as_str().eq_ignore_ascii_case(known)))
        .map(|key| format!("cloud_graph.{}", key.as_str().to_ascii_lowercase()).into())
}

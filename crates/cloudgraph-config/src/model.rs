// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for cloudgraph.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::path::PathBuf;

use cloudgraph_core::{ConnectionMerge, DEFAULT_NAMESPACE};
use serde::{Deserialize, Serialize};

/// File name of the lock document inside the config directory.
pub const LOCK_FILE_NAME: &str = ".cloud-graph.lock.json";

/// Top-level cloudgraph configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CloudGraphConfig {
    /// Settings of the cli itself.
    #[serde(default)]
    pub cloud_graph: CliConfig,

    /// Per-provider scan settings. The keys are the providers found in local configuration.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

impl CloudGraphConfig {
    /// Names of all configured providers, in key order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Path of the plugin lock document.
    pub fn lock_path(&self) -> PathBuf {
        PathBuf::from(&self.cloud_graph.config_dir).join(LOCK_FILE_NAME)
    }
}

/// Cli settings: storage endpoint, working directories, and resolution mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Base URL of the graph storage engine.
    #[serde(default = "default_storage_host")]
    pub storage_host: String,

    /// Directory receiving scan artifacts and schema files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory holding the plugin lock document.
    #[serde(default = "default_config_dir")]
    pub config_dir: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Resolve plugins from the local development tree instead of installing them.
    #[serde(default)]
    pub dev_mode: bool,

    /// Namespace applied to provider names given without one.
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Merge policy for connection-builder results.
    #[serde(default)]
    pub connection_merge: ConnectionMerge,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            storage_host: default_storage_host(),
            data_dir: default_data_dir(),
            config_dir: default_config_dir(),
            log_level: default_log_level(),
            dev_mode: false,
            default_namespace: default_namespace(),
            connection_merge: ConnectionMerge::default(),
        }
    }
}

fn default_storage_host() -> String {
    "http://localhost:8997".to_string()
}

fn default_data_dir() -> String {
    "cg-data".to_string()
}

fn default_config_dir() -> String {
    dirs::config_dir()
        .map(|p| p.join("cloudgraph"))
        .unwrap_or_else(|| PathBuf::from(".cloudgraph"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// Scan settings for one provider.
///
/// Empty lists mean "everything the plugin supports".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub regions: Vec<String>,

    #[serde(default)]
    pub resources: Vec<String>,
}

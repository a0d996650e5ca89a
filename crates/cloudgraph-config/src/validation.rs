// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::CloudGraphConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected validation errors; does not fail fast.
pub fn validate_config(config: &CloudGraphConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let cli = &config.cloud_graph;

    let host = cli.storage_host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "cloud_graph.storage_host must not be empty".to_string(),
        });
    } else if !(host.starts_with("http://") || host.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!(
                "cloud_graph.storage_host `{host}` must start with http:// or https://"
            ),
        });
    }

    if cli.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "cloud_graph.data_dir must not be empty".to_string(),
        });
    }

    if cli.default_namespace.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "cloud_graph.default_namespace must not be empty".to_string(),
        });
    }

    for name in config.providers.keys() {
        if name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "provider tables must have a non-empty name".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

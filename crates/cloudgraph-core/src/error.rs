// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for cloudgraph.

use thiserror::Error;

/// The primary error type used across all cloudgraph crates.
///
/// Fatal variants carry the affected provider(s) and render a message that
/// tells the user what to do next.
#[derive(Debug, Error)]
pub enum CloudGraphError {
    /// Configuration errors (invalid TOML, bad values, unknown keys).
    #[error("configuration error: {0}")]
    Config(String),

    /// The plugin backing a provider could not be found, installed, or loaded.
    #[error("failed to find plugin for provider `{provider}`: {message}")]
    PluginResolution {
        provider: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The plugin declares a host version range the running cli does not satisfy.
    #[error(
        "provider {plugin}@{plugin_version} requires cli version {required} but cli version is {host}"
    )]
    VersionMismatch {
        plugin: String,
        plugin_version: String,
        required: String,
        host: String,
    },

    /// No provider was passed on the command line and none is configured.
    #[error(
        "there are no providers configured and none were passed; pass a provider name or add a [providers.<name>] table to cloudgraph.toml"
    )]
    NoProvidersConfigured,

    /// The storage engine health check failed.
    #[error("storage engine check at {host} failed ({reason}); check that the storage engine is running")]
    StorageUnavailable { host: String, reason: String },

    /// The storage engine rejected the aggregated schema.
    #[error("there was an issue pushing schema for providers {} to {host}: {message}", .providers.join(" | "))]
    SchemaPush {
        providers: Vec<String>,
        host: String,
        message: String,
    },

    /// No persisted scan artifact exists for a provider on load.
    #[error("unable to find saved data for {provider}, run `cg scan {provider}` to fetch new data")]
    MissingScanData { provider: String },

    /// One or more ingestion pushes were rejected. Each entry is `provider/service: reason`.
    #[error("ingestion failed for {}", .failures.join(", "))]
    Ingestion { failures: Vec<String> },

    /// A provider plugin capability (credentials, identity, data) failed.
    #[error("provider `{provider}` failed: {message}")]
    Provider {
        provider: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reading or writing a persisted artifact (scan snapshot, schema file, lock document) failed.
    #[error("artifact error at {path}: {message}")]
    Artifact {
        path: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transport-level storage engine errors.
    #[error("storage error: {message}")]
    Storage {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation was cancelled by an external signal.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CloudGraphError {
    /// Builds an [`CloudGraphError::Artifact`] from an I/O or serde failure.
    pub fn artifact<E>(path: impl AsRef<std::path::Path>, message: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CloudGraphError::Artifact {
            path: path.as_ref().display().to_string(),
            message: format!("{message}: {source}"),
            source: Some(Box::new(source)),
        }
    }
}

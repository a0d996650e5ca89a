// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared state and helpers of the scan and load commands.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use cloudgraph_config::CloudGraphConfig;
use cloudgraph_core::{CloudGraphError, HealthStatus, ProviderSpec, ScanOptions, StorageEngine};
use cloudgraph_graph::{ArtifactCandidate, ArtifactStore};
use cloudgraph_plugin::PluginResolver;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::dispatch::IngestionReport;
use crate::schema::SchemaPushOutcome;

/// Everything a command needs, built once by the caller.
pub struct RunContext {
    pub config: CloudGraphConfig,
    pub resolver: PluginResolver,
    pub storage: Arc<dyn StorageEngine>,
    pub artifacts: ArtifactStore,
    pub options: ScanOptions,
    pub cancel: CancellationToken,
}

impl RunContext {
    /// Artifacts live under the configured data directory.
    pub fn new(
        config: CloudGraphConfig,
        resolver: PluginResolver,
        storage: Arc<dyn StorageEngine>,
        options: ScanOptions,
        cancel: CancellationToken,
    ) -> Self {
        let artifacts = ArtifactStore::new(&config.cloud_graph.data_dir);
        Self {
            config,
            resolver,
            storage,
            artifacts,
            options,
            cancel,
        }
    }

    /// Bare provider name of a `name` or `namespace/name` argument.
    pub(crate) fn provider_name(&self, provider: &str) -> String {
        ProviderSpec::parse_with_namespace(provider, &self.config.cloud_graph.default_namespace).name
    }

    /// Read storage health once; an error counts as unhealthy.
    pub(crate) async fn storage_health(&self) -> HealthStatus {
        match self.storage.health_check().await {
            Ok(status) => status,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }

    /// Run `future` unless the command is cancelled first.
    pub(crate) async fn cancellable<T, F>(&self, future: F) -> Result<T, CloudGraphError>
    where
        F: Future<Output = Result<T, CloudGraphError>>,
    {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(CloudGraphError::Cancelled),
            result = future => result,
        }
    }
}

/// What a finished command did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub providers: Vec<String>,
    pub host: String,
    /// Whether storage was healthy, i.e. whether schema and data were sent.
    pub stored: bool,
    /// Scan artifacts written (scan) or read (load).
    pub artifacts: Vec<PathBuf>,
    pub schema: SchemaPushOutcome,
    pub ingestion: IngestionReport,
}

/// Chooses one artifact when a provider has several.
pub trait ArtifactSelector: Send + Sync {
    /// `candidates` holds at least two entries, newest first.
    fn select(&self, provider: &str, candidates: &[ArtifactCandidate]) -> Result<PathBuf, CloudGraphError>;
}

/// Always picks the newest artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewestArtifact;

impl ArtifactSelector for NewestArtifact {
    fn select(&self, provider: &str, candidates: &[ArtifactCandidate]) -> Result<PathBuf, CloudGraphError> {
        candidates
            .first()
            .map(|candidate| {
                info!(provider, artifact = %candidate.label(), "using newest saved data");
                candidate.path.clone()
            })
            .ok_or_else(|| CloudGraphError::MissingScanData {
                provider: provider.to_string(),
            })
    }
}

/// The providers a command works on: the arguments, else every configured provider.
pub fn requested_providers(
    args: &[String],
    config: &CloudGraphConfig,
) -> Result<Vec<String>, CloudGraphError> {
    if !args.is_empty() {
        info!(providers = %args.join(" | "), "running for providers");
        return Ok(args.to_vec());
    }

    let configured = config.provider_names();
    if configured.is_empty() {
        warn!("there are no providers configured and none were passed");
        return Err(CloudGraphError::NoProvidersConfigured);
    }
    info!(providers = %configured.join(" | "), "found providers in config");
    Ok(configured)
}

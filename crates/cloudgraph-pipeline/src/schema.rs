// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema aggregation across resolved providers.

use std::sync::Arc;

use cloudgraph_core::{CloudGraphError, ProviderPlugin, SchemaDocument, StorageEngine};
use cloudgraph_graph::ArtifactStore;
use tracing::{debug, error, info, warn};

/// What happened to the aggregated schema at the storage engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaPushOutcome {
    /// Storage was unhealthy, nothing was sent.
    Skipped,
    Applied,
    /// Storage rejected the schema; the run continued.
    Failed(String),
}

/// Collects provider schema fragments into one document.
#[derive(Debug)]
pub struct SchemaAggregator<'a> {
    artifacts: &'a ArtifactStore,
}

impl<'a> SchemaAggregator<'a> {
    pub fn new(artifacts: &'a ArtifactStore) -> Self {
        Self { artifacts }
    }

    /// Merge the fragments of every plugin, in the given order.
    ///
    /// Each provider's fragments go to its own schema file; the combined file
    /// is written even when the document is empty. Providers without schema
    /// are skipped with a warning.
    pub fn aggregate(
        &self,
        plugins: &[(String, Arc<dyn ProviderPlugin>)],
    ) -> Result<SchemaDocument, CloudGraphError> {
        let mut document = SchemaDocument::default();
        for (provider, plugin) in plugins {
            info!(provider = %provider, "collecting schema for {provider}");
            let fragments = plugin.schema();
            if fragments.iter().all(|fragment| fragment.trim().is_empty()) {
                warn!(provider = %provider, "no schema found for {provider}, moving on");
                continue;
            }
            self.artifacts.write_schema(Some(plugin.name()), &fragments)?;
            document.extend(fragments);
        }
        self.artifacts.write_schema(None, &document.fragments)?;
        debug!(fragments = document.len(), "aggregated schema");
        Ok(document)
    }

    /// Submit `document` when storage is healthy.
    ///
    /// A rejection is logged with the affected providers and reported as
    /// [`SchemaPushOutcome::Failed`]; it never aborts the command.
    pub async fn apply(
        &self,
        storage: &dyn StorageEngine,
        healthy: bool,
        document: &SchemaDocument,
        providers: &[String],
    ) -> SchemaPushOutcome {
        if !healthy {
            debug!("storage unhealthy, skipping schema push");
            return SchemaPushOutcome::Skipped;
        }
        match storage.set_schema(document).await {
            Ok(()) => {
                info!(host = storage.host(), fragments = document.len(), "schema applied");
                SchemaPushOutcome::Applied
            }
            Err(e) => {
                let failure = CloudGraphError::SchemaPush {
                    providers: providers.to_vec(),
                    host: storage.host().to_string(),
                    message: e.to_string(),
                };
                error!(error = %failure, "{failure}");
                SchemaPushOutcome::Failed(failure.to_string())
            }
        }
    }
}

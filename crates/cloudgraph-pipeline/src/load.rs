// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cg load`: ingest previously persisted scan results.

use std::path::PathBuf;
use std::sync::Arc;

use cloudgraph_core::{CloudGraphError, HealthStatus, ScanResult};
use tracing::{debug, error, info};

use crate::context::{requested_providers, ArtifactSelector, RunContext, RunSummary};
use crate::dispatch::IngestionDispatcher;
use crate::schema::SchemaAggregator;

/// Load the saved scan of `args` (or every configured provider) into storage.
///
/// Storage must be healthy. Every provider's artifact is located before any
/// push is issued, so missing data aborts the command before ingestion.
pub async fn load(
    ctx: &RunContext,
    args: &[String],
    selector: &dyn ArtifactSelector,
) -> Result<RunSummary, CloudGraphError> {
    if let HealthStatus::Unhealthy(reason) = ctx.storage_health().await {
        error!(host = ctx.storage.host(), "storage engine check at {} failed, canceling load", ctx.storage.host());
        return Err(CloudGraphError::StorageUnavailable {
            host: ctx.storage.host().to_string(),
            reason,
        });
    }

    let providers = requested_providers(args, &ctx.config)?;
    let plugins = ctx.resolver.resolve_all(&providers).await?;

    let aggregator = SchemaAggregator::new(&ctx.artifacts);
    let document = aggregator.aggregate(&plugins)?;
    let schema = aggregator
        .apply(ctx.storage.as_ref(), true, &document, &providers)
        .await;

    let mut loaded: Vec<(PathBuf, ScanResult)> = Vec::with_capacity(plugins.len());
    for (provider, _) in &plugins {
        let path = locate_artifact(ctx, provider, selector)?;
        let result = ctx.artifacts.read(&path)?;
        debug!(provider = %provider, path = %path.display(), entities = result.entity_count(), "loaded saved data");
        loaded.push((path, result));
    }

    let mut dispatcher = IngestionDispatcher::new(Arc::clone(&ctx.storage), true, ctx.cancel.clone());
    for ((provider, plugin), (_, result)) in plugins.iter().zip(&loaded) {
        info!(provider = %provider, "beginning load for {provider}");
        dispatcher.dispatch(provider, plugin.as_ref(), result);
    }
    let ingestion = dispatcher.wait().await.into_result()?;

    Ok(RunSummary {
        providers,
        host: ctx.storage.host().to_string(),
        stored: true,
        artifacts: loaded.into_iter().map(|(path, _)| path).collect(),
        schema,
        ingestion,
    })
}

/// The single artifact, or the selector's choice among several.
fn locate_artifact(
    ctx: &RunContext,
    provider: &str,
    selector: &dyn ArtifactSelector,
) -> Result<PathBuf, CloudGraphError> {
    let name = ctx.provider_name(provider);
    let candidates = ctx.artifacts.list(&name)?;
    match candidates.as_slice() {
        [] => {
            error!(provider = %name, "unable to find saved data for {name}");
            Err(CloudGraphError::MissingScanData { provider: name })
        }
        [only] => Ok(only.path.clone()),
        many => selector.select(&name, many),
    }
}

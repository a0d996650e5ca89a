// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cg scan`: fetch live provider data, persist it, and ingest it.

use std::sync::Arc;

use cloudgraph_core::types::DataRequest;
use cloudgraph_core::{CloudGraphError, ProviderPlugin};
use cloudgraph_graph::ConnectionGraphBuilder;
use tracing::{debug, info, warn};

use crate::context::{requested_providers, RunContext, RunSummary};
use crate::dispatch::IngestionDispatcher;
use crate::schema::SchemaAggregator;

/// Scan `args` (or every configured provider).
///
/// An unhealthy storage engine is not fatal here: data is still scanned and
/// persisted, only the schema push and ingestion are skipped.
pub async fn scan(ctx: &RunContext, args: &[String]) -> Result<RunSummary, CloudGraphError> {
    let health = ctx.storage_health().await;
    let healthy = health.is_healthy();
    if !healthy {
        warn!(
            host = ctx.storage.host(),
            status = ?health,
            "storage engine check at {} failed, data will be saved but not loaded",
            ctx.storage.host()
        );
    }

    let providers = requested_providers(args, &ctx.config)?;
    let plugins = ctx.resolver.resolve_all(&providers).await?;

    let aggregator = SchemaAggregator::new(&ctx.artifacts);
    let document = aggregator.aggregate(&plugins)?;
    let schema = aggregator
        .apply(ctx.storage.as_ref(), healthy, &document, &providers)
        .await;

    let builder = ConnectionGraphBuilder::new(ctx.config.cloud_graph.connection_merge);
    let mut dispatcher = IngestionDispatcher::new(Arc::clone(&ctx.storage), healthy, ctx.cancel.clone());
    let mut artifacts = Vec::with_capacity(plugins.len());

    for (provider, plugin) in &plugins {
        info!(provider = %provider, "beginning scan for {provider}");
        let request = scan_request(ctx, provider, plugin.as_ref()).await?;
        let identity = ctx
            .cancellable(plugin.identity(&request.credentials, &ctx.options))
            .await?;
        let data = ctx.cancellable(plugin.data(request)).await?;

        let result = builder.build(plugin.as_ref(), &data, &identity.account_id);
        let name = ctx.provider_name(provider);
        artifacts.push(ctx.artifacts.write_scan(&name, &identity.account_id, &result)?);

        let issued = dispatcher.dispatch(provider, plugin.as_ref(), &result);
        debug!(provider = %provider, issued, "dispatched ingestion");
    }

    let ingestion = dispatcher.wait().await.into_result()?;
    if !healthy {
        warn!("storage engine unavailable, skipped schema push and ingestion");
    }

    Ok(RunSummary {
        providers,
        host: ctx.storage.host().to_string(),
        stored: healthy,
        artifacts,
        schema,
        ingestion,
    })
}

/// Credentials plus the regions and resources to scan.
///
/// Configured lists win; an empty or absent list means everything the plugin
/// supports.
async fn scan_request(
    ctx: &RunContext,
    provider: &str,
    plugin: &dyn ProviderPlugin,
) -> Result<DataRequest, CloudGraphError> {
    let properties = plugin.properties();
    let settings = ctx.config.provider(&ctx.provider_name(provider));

    let regions = settings
        .map(|s| s.regions.clone())
        .filter(|regions| !regions.is_empty())
        .unwrap_or(properties.regions);
    let resources = settings
        .map(|s| s.resources.clone())
        .filter(|resources| !resources.is_empty())
        .unwrap_or_else(|| properties.services.into_values().collect());
    debug!(provider, regions = ?regions, resources = ?resources, "scan settings");

    let credentials = ctx.cancellable(plugin.credentials(&ctx.options)).await?;
    Ok(DataRequest {
        regions,
        resources,
        credentials,
        options: ctx.options,
    })
}

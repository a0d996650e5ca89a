// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires configuration, plugin resolution, and storage into a command run.

use std::sync::Arc;

use cloudgraph_config::CloudGraphConfig;
use cloudgraph_core::{CloudGraphError, ScanOptions};
use cloudgraph_dgraph::DgraphEngine;
use cloudgraph_pipeline::{RunContext, RunSummary};
use cloudgraph_plugin::{LockStore, PluginRegistry, PluginResolver, RegistryInstaller, ResolverMode};
use semver::Version;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::select::PromptSelector;
use crate::Command;

/// Run `command` to completion.
pub async fn execute(
    command: &Command,
    config: CloudGraphConfig,
    cancel: CancellationToken,
) -> Result<RunSummary, CloudGraphError> {
    let args = command.args();
    let options = scan_options(args.debug, args.dev, &config);

    let storage = Arc::new(DgraphEngine::new(&config.cloud_graph.storage_host)?);
    let resolver = build_resolver(&config, options.dev_mode)?;
    info!(
        command = command.name(),
        mode = %resolver.mode(),
        host = %config.cloud_graph.storage_host,
        "starting"
    );

    let ctx = RunContext::new(config, resolver, storage, options, cancel);
    match command {
        Command::Scan(_) => cloudgraph_pipeline::scan(&ctx, &args.providers).await,
        Command::Load(_) => cloudgraph_pipeline::load(&ctx, &args.providers, &PromptSelector).await,
    }
}

/// `--dev` and `cloud_graph.dev_mode` both select development mode.
fn scan_options(debug: bool, dev: bool, config: &CloudGraphConfig) -> ScanOptions {
    ScanOptions {
        debug,
        dev_mode: dev || config.cloud_graph.dev_mode,
    }
}

/// Resolver over the compiled-in provider registry.
///
/// The registry starts empty: provider crates add their manifest and factory
/// with [`PluginRegistry::register`] here. A provider that is not registered
/// fails resolution with [`CloudGraphError::PluginResolution`].
fn build_resolver(config: &CloudGraphConfig, dev_mode: bool) -> Result<PluginResolver, CloudGraphError> {
    let host_version = Version::parse(env!("CARGO_PKG_VERSION"))
        .map_err(|e| CloudGraphError::Internal(format!("invalid cli version: {e}")))?;

    let registry = PluginRegistry::new();
    debug!(providers = registry.len(), "compiled-in provider plugins");

    let resolver = PluginResolver::new(
        ResolverMode::from_dev_flag(dev_mode),
        host_version,
        LockStore::new(config.lock_path()),
        Arc::new(RegistryInstaller::new(Arc::new(registry))),
    )
    .with_default_namespace(config.cloud_graph.default_namespace.clone());
    Ok(resolver)
}

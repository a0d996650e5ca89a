// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider plugin contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CloudGraphError;
use crate::types::{
    ConnectionContext, ConnectionIndex, Credentials, DataRequest, FormatContext, FormattedEntity,
    Identity, ProviderProperties, ScanOptions, SchemaFragment, ServiceData,
};

/// Per-service capability bundle of a provider plugin.
pub trait ServiceModule: Send + Sync {
    /// Normalize one raw instance.
    fn format(&self, ctx: &FormatContext<'_>) -> FormattedEntity;

    /// Build connections for one raw instance.
    ///
    /// `None` means the service has no connection builder.
    fn connections(&self, _ctx: &ConnectionContext<'_>) -> Option<ConnectionIndex> {
        None
    }

    /// Ingestion mutation used to push this service's payloads.
    fn mutation(&self) -> &str;
}

/// A loaded provider plugin.
///
/// Handles are shared as `Arc<dyn ProviderPlugin>` and cached by the resolver
/// for the lifetime of the process.
#[async_trait]
pub trait ProviderPlugin: Send + Sync + 'static {
    /// Provider name this plugin serves (e.g. "aws").
    fn name(&self) -> &str;

    /// Graph type definitions contributed by this provider.
    fn schema(&self) -> Vec<SchemaFragment>;

    /// Capability bundle for a service, if the plugin knows it.
    fn service(&self, name: &str) -> Option<Arc<dyn ServiceModule>>;

    /// Supported regions and services.
    fn properties(&self) -> ProviderProperties;

    async fn credentials(&self, opts: &ScanOptions) -> Result<Credentials, CloudGraphError>;

    async fn identity(
        &self,
        credentials: &Credentials,
        opts: &ScanOptions,
    ) -> Result<Identity, CloudGraphError>;

    /// Fetch raw data for the requested regions and resources.
    async fn data(&self, request: DataRequest) -> Result<Vec<ServiceData>, CloudGraphError>;
}

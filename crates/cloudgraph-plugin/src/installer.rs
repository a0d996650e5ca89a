// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Package installation strategy used by the resolver.

use std::sync::Arc;

use async_trait::async_trait;
use cloudgraph_core::{CloudGraphError, ProviderPlugin};

use crate::manifest::PluginManifest;

/// Installs, describes, and loads provider plugin packages.
///
/// The resolver never touches a package source directly, so tests can swap
/// in an in-memory installer.
#[async_trait]
pub trait PluginInstaller: Send + Sync {
    /// Make `import_path` available at `version` (a pin such as `latest`,
    /// an exact version, or a range).
    async fn install(&self, import_path: &str, version: &str) -> Result<(), CloudGraphError>;

    /// Read the package metadata of `import_path`.
    async fn metadata(&self, import_path: &str) -> Result<PluginManifest, CloudGraphError>;

    /// Load the plugin module behind `import_path`.
    async fn load(&self, import_path: &str) -> Result<Arc<dyn ProviderPlugin>, CloudGraphError>;
}

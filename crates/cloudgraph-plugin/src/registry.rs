// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of compiled-in provider plugins.
//!
//! The `PluginRegistry` stores `PluginEntry` records keyed by package import
//! path (`<namespace>/cg-provider-<name>`). [`RegistryInstaller`] serves those
//! entries through the [`PluginInstaller`] strategy, so the resolver treats
//! compiled-in providers exactly like installed packages.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cloudgraph_core::{CloudGraphError, ProviderPlugin};
use semver::Version;
use tracing::debug;

use crate::compat::satisfies;
use crate::installer::PluginInstaller;
use crate::lock::LATEST;
use crate::manifest::PluginManifest;

/// Factory creating a plugin instance on load.
pub trait PluginFactory: Send + Sync {
    fn create(&self) -> Result<Arc<dyn ProviderPlugin>, CloudGraphError>;
}

impl<F> PluginFactory for F
where
    F: Fn() -> Result<Arc<dyn ProviderPlugin>, CloudGraphError> + Send + Sync,
{
    fn create(&self) -> Result<Arc<dyn ProviderPlugin>, CloudGraphError> {
        self()
    }
}

/// A single entry in the plugin registry.
pub struct PluginEntry {
    /// Package metadata; `manifest.name` is the import path.
    pub manifest: PluginManifest,
    pub factory: Box<dyn PluginFactory>,
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("manifest", &self.manifest)
            .finish_non_exhaustive()
    }
}

/// Registry of compiled-in provider plugins.
#[derive(Debug)]
pub struct PluginRegistry {
    entries: HashMap<String, PluginEntry>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a plugin under its manifest name, replacing any previous entry.
    pub fn register(&mut self, manifest: PluginManifest, factory: Box<dyn PluginFactory>) {
        let import_path = manifest.name.clone();
        self.entries
            .insert(import_path, PluginEntry { manifest, factory });
    }

    pub fn get(&self, import_path: &str) -> Option<&PluginEntry> {
        self.entries.get(import_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, import_path: &str) -> Result<&PluginEntry, CloudGraphError> {
        self.get(import_path)
            .ok_or_else(|| CloudGraphError::PluginResolution {
                provider: import_path.to_string(),
                message: "package is not available in the plugin registry".to_string(),
                source: None,
            })
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns whether the available package `version` satisfies a lock pin.
pub fn pin_matches(version: &str, pin: &str) -> bool {
    if pin == LATEST {
        return true;
    }
    Version::parse(version).is_ok_and(|available| satisfies(&available, pin))
}

/// [`PluginInstaller`] backed by a [`PluginRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryInstaller {
    registry: Arc<PluginRegistry>,
}

impl RegistryInstaller {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl PluginInstaller for RegistryInstaller {
    async fn install(&self, import_path: &str, version: &str) -> Result<(), CloudGraphError> {
        let entry = self.registry.entry(import_path)?;
        if !pin_matches(&entry.manifest.version, version) {
            return Err(CloudGraphError::PluginResolution {
                provider: import_path.to_string(),
                message: format!(
                    "available version {} does not satisfy pinned version {version}",
                    entry.manifest.version
                ),
                source: None,
            });
        }
        debug!(import_path, version = %entry.manifest.version, "plugin available in registry");
        Ok(())
    }

    async fn metadata(&self, import_path: &str) -> Result<PluginManifest, CloudGraphError> {
        Ok(self.registry.entry(import_path)?.manifest.clone())
    }

    async fn load(&self, import_path: &str) -> Result<Arc<dyn ProviderPlugin>, CloudGraphError> {
        self.registry.entry(import_path)?.factory.create()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudgraph_core::types::{
        Credentials, DataRequest, Identity, ProviderProperties, ScanOptions, ServiceData,
    };
    use cloudgraph_core::ServiceModule;

    struct NullPlugin;

    #[async_trait]
    impl ProviderPlugin for NullPlugin {
        fn name(&self) -> &str {
            "null"
        }
        fn schema(&self) -> Vec<String> {
            Vec::new()
        }
        fn service(&self, _name: &str) -> Option<Arc<dyn ServiceModule>> {
            None
        }
        fn properties(&self) -> ProviderProperties {
            ProviderProperties::default()
        }
        async fn credentials(&self, _opts: &ScanOptions) -> Result<Credentials, CloudGraphError> {
            Ok(Credentials::Null)
        }
        async fn identity(
            &self,
            _credentials: &Credentials,
            _opts: &ScanOptions,
        ) -> Result<Identity, CloudGraphError> {
            Ok(Identity::new("0"))
        }
        async fn data(&self, _request: DataRequest) -> Result<Vec<ServiceData>, CloudGraphError> {
            Ok(Vec::new())
        }
    }

    fn null_factory() -> Box<dyn PluginFactory> {
        Box::new(|| -> Result<Arc<dyn ProviderPlugin>, CloudGraphError> { Ok(Arc::new(NullPlugin)) })
    }

    fn registry_with(name: &str, version: &str) -> Arc<PluginRegistry> {
        let mut registry = PluginRegistry::new();
        registry.register(PluginManifest::new(name, version), null_factory());
        Arc::new(registry)
    }

    #[test]
    fn register_and_get_roundtrip() {
        let registry = registry_with("@cloudgraph/cg-provider-null", "0.1.0");
        let entry = registry.get("@cloudgraph/cg-provider-null").unwrap();
        assert_eq!(entry.manifest.version, "0.1.0");
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }

    #[test]
    fn pins() {
        assert!(pin_matches("0.4.0", LATEST));
        assert!(pin_matches("0.4.0", "0.4.0"));
        assert!(!pin_matches("0.4.1", "0.4.0"));
        assert!(pin_matches("0.4.1", "^0.4.0"));
        assert!(!pin_matches("not-a-version", "^0.4.0"));
    }

    #[tokio::test]
    async fn installer_serves_registered_package() {
        let installer = RegistryInstaller::new(registry_with("@cloudgraph/cg-provider-null", "1.2.0"));
        installer
            .install("@cloudgraph/cg-provider-null", "^1.0.0")
            .await
            .unwrap();
        let manifest = installer.metadata("@cloudgraph/cg-provider-null").await.unwrap();
        assert_eq!(manifest.version, "1.2.0");
        let plugin = installer.load("@cloudgraph/cg-provider-null").await.unwrap();
        assert_eq!(plugin.name(), "null");
    }

    #[tokio::test]
    async fn installer_rejects_unknown_package_and_unsatisfied_pin() {
        let installer = RegistryInstaller::new(registry_with("@cloudgraph/cg-provider-null", "1.2.0"));
        let err = installer
            .install("@cloudgraph/cg-provider-aws", LATEST)
            .await
            .unwrap_err();
        assert!(matches!(err, CloudGraphError::PluginResolution { .. }));

        let err = installer
            .install("@cloudgraph/cg-provider-null", "2.0.0")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not satisfy pinned version 2.0.0"));
    }
}

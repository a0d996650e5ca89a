// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider name to loaded plugin resolution.
//!
//! Resolved plugins are cached by provider name for the lifetime of the
//! resolver; a cache hit is returned without re-checking compatibility.

use std::collections::HashMap;
use std::sync::Arc;

use cloudgraph_core::{CloudGraphError, ProviderPlugin, ProviderSpec, DEFAULT_NAMESPACE};
use semver::Version;
use strum::{Display, EnumString};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::compat::check_version_compatibility;
use crate::installer::PluginInstaller;
use crate::lock::LockStore;

/// Where plugins come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ResolverMode {
    /// Load the local module directly, without installing or pinning.
    Development,
    /// Install the pinned version from the package source, then load it.
    Production,
}

impl ResolverMode {
    pub fn from_dev_flag(dev_mode: bool) -> Self {
        if dev_mode {
            ResolverMode::Development
        } else {
            ResolverMode::Production
        }
    }
}

/// Resolves provider names to loaded, version-checked plugins.
pub struct PluginResolver {
    mode: ResolverMode,
    host_version: Version,
    default_namespace: String,
    lock: LockStore,
    installer: Arc<dyn PluginInstaller>,
    cache: RwLock<HashMap<String, Arc<dyn ProviderPlugin>>>,
}

impl std::fmt::Debug for PluginResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginResolver")
            .field("mode", &self.mode)
            .field("host_version", &self.host_version)
            .field("default_namespace", &self.default_namespace)
            .field("lock", &self.lock)
            .finish_non_exhaustive()
    }
}

impl PluginResolver {
    pub fn new(
        mode: ResolverMode,
        host_version: Version,
        lock: LockStore,
        installer: Arc<dyn PluginInstaller>,
    ) -> Self {
        Self {
            mode,
            host_version,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            lock,
            installer,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Override the namespace used for provider names given without one.
    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    pub fn mode(&self) -> ResolverMode {
        self.mode
    }

    pub fn host_version(&self) -> &Version {
        &self.host_version
    }

    /// Resolve `provider` (`name` or `namespace/name`) to its plugin.
    ///
    /// Fails with `PluginResolution` when the package cannot be installed or
    /// loaded, and with `VersionMismatch` when the plugin's declared cli range
    /// excludes the running version. Neither is retried.
    pub async fn resolve(&self, provider: &str) -> Result<Arc<dyn ProviderPlugin>, CloudGraphError> {
        let spec = ProviderSpec::parse_with_namespace(provider, &self.default_namespace);
        if provider.contains('/') {
            info!(
                namespace = %spec.namespace,
                provider = %spec.name,
                "installing community provider {} from namespace {}",
                spec.name,
                spec.namespace
            );
        }

        if let Some(plugin) = self.cache.read().await.get(&spec.name) {
            debug!(provider = %spec.name, "plugin cache hit");
            return Ok(Arc::clone(plugin));
        }

        debug!(provider = %spec.name, mode = %self.mode, "checking for provider module");
        let import_path = spec.import_path();
        let loaded = match self.mode {
            ResolverMode::Development => self.load_development(&import_path).await,
            ResolverMode::Production => self.load_production(&spec, &import_path).await,
        };

        let plugin = loaded.map_err(|e| {
            error!(provider = %spec.name, error = %e, "failed to install plugin for {}", spec.name);
            classify(&spec.name, e)
        })?;

        self.cache
            .write()
            .await
            .insert(spec.name.clone(), Arc::clone(&plugin));
        info!(provider = %spec.name, "{} module check complete", spec.name);
        Ok(plugin)
    }

    /// Resolve every provider in order, stopping at the first failure.
    pub async fn resolve_all(
        &self,
        providers: &[String],
    ) -> Result<Vec<(String, Arc<dyn ProviderPlugin>)>, CloudGraphError> {
        let mut resolved = Vec::with_capacity(providers.len());
        for provider in providers {
            resolved.push((provider.clone(), self.resolve(provider).await?));
        }
        Ok(resolved)
    }

    /// The cached plugin for a provider name, if it was resolved before.
    pub async fn cached(&self, name: &str) -> Option<Arc<dyn ProviderPlugin>> {
        self.cache.read().await.get(name).cloned()
    }

    async fn load_development(
        &self,
        import_path: &str,
    ) -> Result<Arc<dyn ProviderPlugin>, CloudGraphError> {
        self.ensure_compatible(import_path).await?;
        self.installer.load(import_path).await
    }

    async fn load_production(
        &self,
        spec: &ProviderSpec,
        import_path: &str,
    ) -> Result<Arc<dyn ProviderPlugin>, CloudGraphError> {
        let pinned = self.lock.pinned_version(&spec.name)?;
        info!(provider = %spec.name, version = %pinned, "requiring {} module version {}", spec.name, pinned);
        self.installer.install(import_path, &pinned).await?;
        self.ensure_compatible(import_path).await?;
        let plugin = self.installer.load(import_path).await?;
        info!(provider = %spec.name, "{} plugin installed successfully", spec.name);
        Ok(plugin)
    }

    async fn ensure_compatible(&self, import_path: &str) -> Result<(), CloudGraphError> {
        let manifest = self.installer.metadata(import_path).await?;
        if check_version_compatibility(&manifest, &self.host_version) {
            return Ok(());
        }
        Err(CloudGraphError::VersionMismatch {
            plugin: import_path.to_string(),
            plugin_version: manifest.version.clone(),
            required: manifest.required_host_range().unwrap_or_default().to_string(),
            host: self.host_version.to_string(),
        })
    }
}

/// Everything except a version mismatch becomes a resolution failure for `provider`.
fn classify(provider: &str, err: CloudGraphError) -> CloudGraphError {
    match err {
        mismatch @ CloudGraphError::VersionMismatch { .. } => mismatch,
        CloudGraphError::PluginResolution {
            message, source, ..
        } => CloudGraphError::PluginResolution {
            provider: provider.to_string(),
            message,
            source,
        },
        other => CloudGraphError::PluginResolution {
            provider: provider.to_string(),
            message: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn mode_from_dev_flag() {
        assert_eq!(ResolverMode::from_dev_flag(true), ResolverMode::Development);
        assert_eq!(ResolverMode::from_dev_flag(false), ResolverMode::Production);
        assert_eq!(ResolverMode::Production.to_string(), "production");
        assert_eq!(
            ResolverMode::from_str("development").unwrap(),
            ResolverMode::Development
        );
    }

    #[test]
    fn classify_keeps_mismatch_and_renames_resolution() {
        let mismatch = CloudGraphError::VersionMismatch {
            plugin: "p".into(),
            plugin_version: "1.0.0".into(),
            required: "^2".into(),
            host: "1.0.0".into(),
        };
        assert!(matches!(
            classify("aws", mismatch),
            CloudGraphError::VersionMismatch { .. }
        ));

        let resolution = CloudGraphError::PluginResolution {
            provider: "@cloudgraph/cg-provider-aws".into(),
            message: "missing".into(),
            source: None,
        };
        match classify("aws", resolution) {
            CloudGraphError::PluginResolution { provider, message, .. } => {
                assert_eq!(provider, "aws");
                assert_eq!(message, "missing");
            }
            other => panic!("unexpected {other:?}"),
        }

        let io = CloudGraphError::Internal("boom".into());
        assert!(matches!(
            classify("aws", io),
            CloudGraphError::PluginResolution { .. }
        ));
    }
}

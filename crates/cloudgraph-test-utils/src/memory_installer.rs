// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory package source for the plugin resolver.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use cloudgraph_core::{CloudGraphError, ProviderPlugin};
use cloudgraph_plugin::registry::pin_matches;
use cloudgraph_plugin::{PluginInstaller, PluginManifest};

struct MemoryPackage {
    manifest: PluginManifest,
    plugin: Arc<dyn ProviderPlugin>,
}

/// A `PluginInstaller` serving packages from memory.
///
/// Package metadata can be replaced after construction, and every install
/// and load is counted, so tests can observe exactly what the resolver did.
pub struct MemoryInstaller {
    packages: Mutex<HashMap<String, MemoryPackage>>,
    failing_installs: HashSet<String>,
    installs: Mutex<Vec<(String, String)>>,
    metadata_reads: AtomicUsize,
    loads: AtomicUsize,
}

impl MemoryInstaller {
    pub fn new() -> Self {
        Self {
            packages: Mutex::new(HashMap::new()),
            failing_installs: HashSet::new(),
            installs: Mutex::new(Vec::new()),
            metadata_reads: AtomicUsize::new(0),
            loads: AtomicUsize::new(0),
        }
    }

    /// Serve `plugin` under `manifest.name`.
    pub fn with_package(mut self, manifest: PluginManifest, plugin: Arc<dyn ProviderPlugin>) -> Self {
        self.packages
            .get_mut()
            .insert(manifest.name.clone(), MemoryPackage { manifest, plugin });
        self
    }

    /// Make installing `import_path` fail.
    pub fn failing_install(mut self, import_path: impl Into<String>) -> Self {
        self.failing_installs.insert(import_path.into());
        self
    }

    /// Replace the metadata of an already served package.
    pub async fn set_metadata(&self, manifest: PluginManifest) {
        if let Some(package) = self.packages.lock().await.get_mut(&manifest.name) {
            package.manifest = manifest;
        }
    }

    /// `(import_path, version)` of every install request so far.
    pub async fn installs(&self) -> Vec<(String, String)> {
        self.installs.lock().await.clone()
    }

    pub fn metadata_reads(&self) -> usize {
        self.metadata_reads.load(Ordering::SeqCst)
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl Default for MemoryInstaller {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(import_path: &str) -> CloudGraphError {
    CloudGraphError::PluginResolution {
        provider: import_path.to_string(),
        message: format!("package {import_path} not found"),
        source: None,
    }
}

#[async_trait]
impl PluginInstaller for MemoryInstaller {
    async fn install(&self, import_path: &str, version: &str) -> Result<(), CloudGraphError> {
        self.installs
            .lock()
            .await
            .push((import_path.to_string(), version.to_string()));

        if self.failing_installs.contains(import_path) {
            return Err(CloudGraphError::PluginResolution {
                provider: import_path.to_string(),
                message: "install failed".to_string(),
                source: None,
            });
        }

        let packages = self.packages.lock().await;
        let package = packages.get(import_path).ok_or_else(|| not_found(import_path))?;
        if !pin_matches(&package.manifest.version, version) {
            return Err(CloudGraphError::PluginResolution {
                provider: import_path.to_string(),
                message: format!("no version of {import_path} matches {version}"),
                source: None,
            });
        }
        Ok(())
    }

    async fn metadata(&self, import_path: &str) -> Result<PluginManifest, CloudGraphError> {
        self.metadata_reads.fetch_add(1, Ordering::SeqCst);
        self.packages
            .lock()
            .await
            .get(import_path)
            .map(|package| package.manifest.clone())
            .ok_or_else(|| not_found(import_path))
    }

    async fn load(&self, import_path: &str) -> Result<Arc<dyn ProviderPlugin>, CloudGraphError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.packages
            .lock()
            .await
            .get(import_path)
            .map(|package| Arc::clone(&package.plugin))
            .ok_or_else(|| not_found(import_path))
    }
}

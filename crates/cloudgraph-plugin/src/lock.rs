// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin version lock document.
//!
//! `<config_dir>/.cloud-graph.lock.json` maps provider names to the plugin
//! version pinned for them. Every write rewrites the whole document; only one
//! cloudgraph process is expected to touch it at a time.

use std::path::{Path, PathBuf};

use cloudgraph_core::CloudGraphError;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Pin recorded for providers seen for the first time.
pub const LATEST: &str = "latest";

/// Reader/writer for the lock document.
#[derive(Debug, Clone)]
pub struct LockStore {
    path: PathBuf,
}

impl LockStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the version pinned for `provider`.
    ///
    /// An unseen provider is pinned to [`LATEST`] and the document is
    /// rewritten. A missing or unreadable document counts as empty.
    pub fn pinned_version(&self, provider: &str) -> Result<String, CloudGraphError> {
        let mut document = self.read_document();

        if let Some(pinned) = document.get(provider).and_then(Value::as_str) {
            return Ok(pinned.to_string());
        }

        document.insert(provider.to_string(), Value::String(LATEST.to_string()));
        self.write_document(&document)?;
        debug!(provider, path = %self.path.display(), "pinned provider to latest");
        Ok(LATEST.to_string())
    }

    fn read_document(&self) -> Map<String, Value> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => {
                info!(path = %self.path.display(), "no lock file found for cloudgraph, creating one");
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            _ => {
                info!(path = %self.path.display(), "lock file unreadable, starting from an empty one");
                Map::new()
            }
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<(), CloudGraphError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CloudGraphError::artifact(parent, "failed to create config directory", e)
                })?;
            }
        }
        let content = serde_json::to_string_pretty(document)
            .map_err(|e| CloudGraphError::artifact(&self.path, "failed to encode lock file", e))?;
        std::fs::write(&self.path, content)
            .map_err(|e| CloudGraphError::artifact(&self.path, "failed to write lock file", e))
    }
}

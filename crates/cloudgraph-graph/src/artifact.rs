// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence of scan snapshots and schema files under the data directory.
//!
//! Scan snapshots are named `<provider>_<account>_<unix millis>.json`. Schema
//! files are written next to them for inspection: one
//! `<provider>_schema.graphql` per provider plus the combined
//! `schema.graphql`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use cloudgraph_core::types::SchemaFragment;
use cloudgraph_core::{CloudGraphError, ScanResult};
use tracing::{debug, info};

/// Name of the combined schema file.
pub const COMBINED_SCHEMA_FILE: &str = "schema.graphql";

const ARTIFACT_EXTENSION: &str = ".json";

/// One persisted scan snapshot available for loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCandidate {
    pub path: PathBuf,
    pub provider: String,
    pub account_id: String,
    pub timestamp_millis: i64,
}

impl ArtifactCandidate {
    /// Parse an artifact path belonging to `provider`.
    ///
    /// Returns `None` for any file not following the naming pattern.
    pub fn parse(path: &Path, provider: &str) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let stem = file_name.strip_suffix(ARTIFACT_EXTENSION)?;
        let rest = stem.strip_prefix(provider)?.strip_prefix('_')?;
        let (account_id, millis) = rest.split_once('_')?;
        if account_id.is_empty() || millis.contains('_') {
            return None;
        }
        let timestamp_millis = millis.parse().ok()?;
        Some(Self {
            path: path.to_path_buf(),
            provider: provider.to_string(),
            account_id: account_id.to_string(),
            timestamp_millis,
        })
    }

    /// Human-readable `"<provider> <account> <UTC date-time>"` label.
    pub fn label(&self) -> String {
        let when = DateTime::<Utc>::from_timestamp_millis(self.timestamp_millis)
            .map(|at| at.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
            .unwrap_or_else(|| self.timestamp_millis.to_string());
        format!("{} {} {}", self.provider, self.account_id, when)
    }
}

/// Map a selected label back to its artifact path.
pub fn resolve_selection(
    candidates: &[ArtifactCandidate],
    selection: &str,
) -> Result<PathBuf, CloudGraphError> {
    candidates
        .iter()
        .find(|candidate| candidate.label() == selection)
        .map(|candidate| candidate.path.clone())
        .ok_or_else(|| CloudGraphError::Internal(format!("no saved data matches selection `{selection}`")))
}

/// Reads and writes artifacts under one data directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<(), CloudGraphError> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)
                .map_err(|e| CloudGraphError::artifact(&self.dir, "failed to create data directory", e))?;
            debug!(path = %self.dir.display(), "created data directory");
        }
        Ok(())
    }

    /// Persist `result` stamped with the current time.
    pub fn write_scan(
        &self,
        provider: &str,
        account: &str,
        result: &ScanResult,
    ) -> Result<PathBuf, CloudGraphError> {
        self.write_scan_at(provider, account, Utc::now().timestamp_millis(), result)
    }

    /// Persist `result` under an explicit timestamp.
    ///
    /// Underscores in the account are replaced with `-` so the name stays
    /// parseable.
    pub fn write_scan_at(
        &self,
        provider: &str,
        account: &str,
        timestamp_millis: i64,
        result: &ScanResult,
    ) -> Result<PathBuf, CloudGraphError> {
        self.ensure_dir()?;
        let account = account.replace('_', "-");
        let path = self
            .dir
            .join(format!("{provider}_{account}_{timestamp_millis}{ARTIFACT_EXTENSION}"));
        let json = serde_json::to_string_pretty(result)
            .map_err(|e| CloudGraphError::artifact(&path, "failed to encode scan result", e))?;
        std::fs::write(&path, json)
            .map_err(|e| CloudGraphError::artifact(&path, "failed to write scan result", e))?;

        info!(
            provider,
            path = %path.display(),
            entities = result.entity_count(),
            "saved scan result"
        );
        Ok(path)
    }

    /// Every artifact for `provider`, newest first. A missing directory is empty.
    pub fn list(&self, provider: &str) -> Result<Vec<ArtifactCandidate>, CloudGraphError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| CloudGraphError::artifact(&self.dir, "failed to list data directory", e))?;

        let mut candidates: Vec<ArtifactCandidate> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
            .filter_map(|entry| ArtifactCandidate::parse(&entry.path(), provider))
            .collect();
        candidates.sort_by(|a, b| {
            b.timestamp_millis
                .cmp(&a.timestamp_millis)
                .then_with(|| a.path.cmp(&b.path))
        });
        Ok(candidates)
    }

    /// Read a persisted scan result.
    pub fn read(&self, path: &Path) -> Result<ScanResult, CloudGraphError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CloudGraphError::artifact(path, "failed to read scan result", e))?;
        serde_json::from_str(&content)
            .map_err(|e| CloudGraphError::artifact(path, "failed to parse scan result", e))
    }

    /// Write schema fragments, to `<provider>_schema.graphql` or, without a
    /// provider, to the combined file.
    pub fn write_schema(
        &self,
        provider: Option<&str>,
        fragments: &[SchemaFragment],
    ) -> Result<PathBuf, CloudGraphError> {
        self.ensure_dir()?;
        let path = match provider {
            Some(provider) => self.dir.join(format!("{provider}_schema.graphql")),
            None => self.dir.join(COMBINED_SCHEMA_FILE),
        };
        std::fs::write(&path, fragments.join("\n"))
            .map_err(|e| CloudGraphError::artifact(&path, "failed to write schema file", e))?;
        debug!(path = %path.display(), fragments = fragments.len(), "wrote schema file");
        Ok(path)
    }
}

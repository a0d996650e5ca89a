// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin package metadata.
//!
//! Every provider package ships a JSON metadata document naming itself, its
//! version, and optionally the range of cli versions it works with:
//!
//! ```json
//! { "name": "@cloudgraph/cg-provider-aws", "version": "0.4.0",
//!   "cloudGraph": { "version": "^0.1.0" } }
//! ```

use serde::{Deserialize, Serialize};

/// Parsed plugin package metadata. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Package name (e.g., "@cloudgraph/cg-provider-aws").
    pub name: String,
    /// Semantic version string of the package.
    pub version: String,
    /// Host compatibility declaration.
    #[serde(rename = "cloudGraph", default, skip_serializing_if = "Option::is_none")]
    pub cloud_graph: Option<HostRequirement>,
}

/// The `cloudGraph` section of the package metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRequirement {
    /// Range of cli versions the plugin supports, npm range syntax.
    pub version: Option<String>,
}

impl PluginManifest {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            cloud_graph: None,
        }
    }

    /// Declare the supported cli version range.
    pub fn requiring_host(mut self, range: impl Into<String>) -> Self {
        self.cloud_graph = Some(HostRequirement {
            version: Some(range.into()),
        });
        self
    }

    /// The declared cli version range; blank ranges count as undeclared.
    pub fn required_host_range(&self) -> Option<&str> {
        self.cloud_graph
            .as_ref()
            .and_then(|req| req.version.as_deref())
            .map(str::trim)
            .filter(|range| !range.is_empty())
    }
}

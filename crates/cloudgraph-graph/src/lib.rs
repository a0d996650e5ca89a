// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource graph assembly for cloudgraph.
//!
//! Raw provider data is turned into a [`ScanResult`] by the
//! [`ConnectionGraphBuilder`], persisted through the [`ArtifactStore`], and
//! materialised into ingestion payloads by the [`ConnectionResolver`].
//!
//! [`ScanResult`]: cloudgraph_core::ScanResult

pub mod artifact;
pub mod builder;
pub mod connect;

pub use artifact::{resolve_selection, ArtifactCandidate, ArtifactStore, COMBINED_SCHEMA_FILE};
pub use builder::{merge_connections, ConnectionGraphBuilder};
pub use connect::{resolve_payload, ConnectionResolver};

// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for cloudgraph.
//!
//! This crate provides the error type, the resource graph data model, and the
//! capability traits through which the core talks to provider plugins and to
//! the graph storage engine.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CloudGraphError;
pub use traits::{ProviderPlugin, ServiceModule, StorageEngine};
pub use types::{
    ConnectedEntityPayload, ConnectionIndex, ConnectionMerge, ConnectionRecord, EntityGroup,
    FormattedEntity, HealthStatus, ProviderSpec, PushRequest, ScanOptions, ScanResult,
    SchemaDocument, DEFAULT_NAMESPACE,
};

// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage engine contract for graph-query backends (Dgraph, etc.).

use async_trait::async_trait;

use crate::error::CloudGraphError;
use crate::types::{HealthStatus, PushRequest, SchemaDocument};

/// A graph-query storage engine that accepts schema and entity pushes.
#[async_trait]
pub trait StorageEngine: Send + Sync + 'static {
    /// Host identifier, used for user-facing reporting only.
    fn host(&self) -> &str;

    /// Check whether the engine is reachable and operational.
    async fn health_check(&self) -> Result<HealthStatus, CloudGraphError>;

    /// Replace the engine's schema with `schema`.
    async fn set_schema(&self, schema: &SchemaDocument) -> Result<(), CloudGraphError>;

    /// Submit one mutation with its input payloads.
    async fn push(&self, request: PushRequest) -> Result<(), CloudGraphError>;
}

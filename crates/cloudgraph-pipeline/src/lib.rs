// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The cloudgraph command pipeline.
//!
//! Both commands share one shape: check storage health, resolve plugins,
//! aggregate and apply the schema, produce one [`ScanResult`] per provider
//! (live scan or persisted artifact), then dispatch ingestion and wait for
//! every push.
//!
//! [`ScanResult`]: cloudgraph_core::ScanResult

pub mod context;
pub mod dispatch;
pub mod load;
pub mod scan;
pub mod schema;

pub use context::{requested_providers, ArtifactSelector, NewestArtifact, RunContext, RunSummary};
pub use dispatch::{IngestionDispatcher, IngestionFailure, IngestionReport, ServiceKey};
pub use load::load;
pub use scan::scan;
pub use schema::{SchemaAggregator, SchemaPushOutcome};

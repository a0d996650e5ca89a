// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits consumed by the cloudgraph core.
//!
//! Provider plugins and storage engines are external collaborators; the core
//! only sees them through these traits, which use `#[async_trait]` for
//! dynamic dispatch.

pub mod provider;
pub mod storage;

pub use provider::{ProviderPlugin, ServiceModule};
pub use storage::StorageEngine;

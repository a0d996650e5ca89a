// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for cloudgraph integration tests.
//!
//! Provides mock collaborators for fast, deterministic, CI-runnable tests
//! without real provider packages or a running storage engine.
//!
//! # Components
//!
//! - [`MockPlugin`] - Provider plugin serving pre-configured raw data
//! - [`MockService`] - Service module with pass-through formatting and optional connections
//! - [`MockStorage`] - Storage engine recording schema and push calls
//! - [`MemoryInstaller`] - In-memory package source for the plugin resolver

pub mod memory_installer;
pub mod mock_plugin;
pub mod mock_storage;

pub use memory_installer::MemoryInstaller;
pub use mock_plugin::{MockPlugin, MockService};
pub use mock_storage::MockStorage;

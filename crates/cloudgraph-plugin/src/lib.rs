// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider plugin resolution for cloudgraph.
//!
//! A provider name is resolved to a loaded [`ProviderPlugin`] by the
//! [`PluginResolver`], which pins versions through the [`LockStore`], installs
//! and loads packages through an injectable [`PluginInstaller`], and refuses
//! any plugin whose declared host-version range the running cli does not
//! satisfy.
//!
//! [`ProviderPlugin`]: cloudgraph_core::ProviderPlugin

pub mod compat;
pub mod installer;
pub mod lock;
pub mod manifest;
pub mod registry;
pub mod resolver;

pub use compat::{check_version_compatibility, satisfies};
pub use installer::PluginInstaller;
pub use lock::{LockStore, LATEST};
pub use manifest::{HostRequirement, PluginManifest};
pub use registry::{PluginEntry, PluginFactory, PluginRegistry, RegistryInstaller};
pub use resolver::{PluginResolver, ResolverMode};

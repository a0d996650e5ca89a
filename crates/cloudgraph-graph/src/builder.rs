// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scan-time graph assembly.

use cloudgraph_core::types::{ConnectionContext, FormatContext, ServiceData};
use cloudgraph_core::{ConnectionIndex, ConnectionMerge, EntityGroup, ProviderPlugin, ScanResult};
use tracing::{debug, warn};

/// Turns one provider's raw data into entities plus a connection index.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionGraphBuilder {
    merge: ConnectionMerge,
}

impl ConnectionGraphBuilder {
    pub fn new(merge: ConnectionMerge) -> Self {
        Self { merge }
    }

    pub fn merge_policy(&self) -> ConnectionMerge {
        self.merge
    }

    /// Format every raw instance and collect its connections.
    ///
    /// Each service block yields one entity group, in input order, holding the
    /// instances of every region in key order. Blocks whose service the plugin
    /// does not know are skipped.
    pub fn build(
        &self,
        plugin: &dyn ProviderPlugin,
        provider_data: &[ServiceData],
        account: &str,
    ) -> ScanResult {
        let mut result = ScanResult::default();

        for block in provider_data {
            let Some(service) = plugin.service(&block.name) else {
                warn!(
                    provider = plugin.name(),
                    service = %block.name,
                    "no service module for {}, skipping", block.name
                );
                continue;
            };

            let mut entities = Vec::new();
            for (region, instances) in &block.data {
                for instance in instances {
                    entities.push(service.format(&FormatContext {
                        instance,
                        region,
                        account,
                    }));

                    let connections = service.connections(&ConnectionContext {
                        instance,
                        region,
                        account,
                        full_dataset: provider_data,
                    });
                    if let Some(connections) = connections {
                        merge_connections(&mut result.connections, connections, self.merge);
                    }
                }
            }

            debug!(
                provider = plugin.name(),
                service = %block.name,
                count = entities.len(),
                "formatted service data"
            );
            result.entities.push(EntityGroup {
                service_name: block.name.clone(),
                data: entities,
            });
        }

        result
    }
}

/// Merge `incoming` into `index` under `policy`.
pub fn merge_connections(index: &mut ConnectionIndex, incoming: ConnectionIndex, policy: ConnectionMerge) {
    for (id, records) in incoming {
        match policy {
            ConnectionMerge::LastWriteWins => {
                index.insert(id, records);
            }
            ConnectionMerge::FirstWriteWins => {
                index.entry(id).or_insert(records);
            }
            ConnectionMerge::Append => index.entry(id).or_default().extend(records),
        }
    }
}

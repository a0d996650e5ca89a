// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection resolution: entity plus connection index to ingestion payload.

use std::collections::HashMap;

use cloudgraph_core::{ConnectedEntityPayload, FormattedEntity, ScanResult};
use tracing::trace;

/// Resolves entities of one [`ScanResult`] into connected payloads.
///
/// Builds an identifier index over every entity once, so resolving a whole
/// scan is linear in the number of connection records.
#[derive(Debug)]
pub struct ConnectionResolver<'a> {
    scan: &'a ScanResult,
    by_id: HashMap<&'a str, &'a FormattedEntity>,
}

impl<'a> ConnectionResolver<'a> {
    pub fn new(scan: &'a ScanResult) -> Self {
        let mut by_id = HashMap::new();
        for entity in scan.entities.iter().flat_map(|group| group.data.iter()) {
            if let Some(id) = entity.id() {
                // First entity with an identifier wins.
                by_id.entry(id).or_insert(entity);
            }
        }
        Self { scan, by_id }
    }

    /// The payload for `entity`: its fields plus one list per relation field.
    ///
    /// Records whose target is not part of the scan are skipped. Targets are
    /// attached in discovery order.
    pub fn resolve(&self, entity: &FormattedEntity) -> ConnectedEntityPayload {
        let mut payload = ConnectedEntityPayload::from_entity(entity);
        let Some(records) = entity.id().and_then(|id| self.scan.connections.get(id)) else {
            return payload;
        };

        for record in records {
            match self.by_id.get(record.target_identifier.as_str()) {
                Some(target) => payload.push_relation(&record.relation_field, target),
                None => trace!(
                    target = %record.target_identifier,
                    resource_type = %record.target_resource_type,
                    "connection target not found in scan"
                ),
            }
        }
        payload
    }

    /// Resolve every entity of a group in order.
    pub fn resolve_all(&self, entities: &[FormattedEntity]) -> Vec<ConnectedEntityPayload> {
        entities.iter().map(|entity| self.resolve(entity)).collect()
    }
}

/// Resolve a single entity against `scan`. Pure and idempotent.
pub fn resolve_payload(entity: &FormattedEntity, scan: &ScanResult) -> ConnectedEntityPayload {
    ConnectionResolver::new(scan).resolve(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudgraph_core::{ConnectionIndex, ConnectionRecord, EntityGroup};
    use serde_json::json;

    fn entity(value: serde_json::Value) -> FormattedEntity {
        FormattedEntity::try_from(value).unwrap()
    }

    fn scan(connections: ConnectionIndex) -> ScanResult {
        ScanResult {
            entities: vec![
                EntityGroup {
                    service_name: "ec2".into(),
                    data: vec![entity(json!({"id": "i-1", "name": "web"}))],
                },
                EntityGroup {
                    service_name: "alb".into(),
                    data: vec![
                        entity(json!({"id": "alb-1"})),
                        entity(json!({"id": "alb-2"})),
                    ],
                },
            ],
            connections,
        }
    }

    #[test]
    fn entity_without_connections_is_unchanged() {
        let scan = scan(ConnectionIndex::new());
        let base = &scan.entities[0].data[0];
        let payload = resolve_payload(base, &scan);
        assert_eq!(payload.0, base.0);
    }

    #[test]
    fn two_records_on_one_field_fan_out_in_order() {
        let scan = scan(ConnectionIndex::from([(
            "i-1".to_string(),
            vec![
                ConnectionRecord::new("alb", "alb", "alb-2"),
                ConnectionRecord::new("alb", "alb", "alb-1"),
            ],
        )]));
        let payload = resolve_payload(&scan.entities[0].data[0], &scan);
        assert_eq!(
            payload.get("alb"),
            Some(&json!([{"id": "alb-2"}, {"id": "alb-1"}]))
        );
        assert_eq!(payload.get("name"), Some(&json!("web")));
    }

    #[test]
    fn missing_target_is_skipped() {
        let scan = scan(ConnectionIndex::from([(
            "i-1".to_string(),
            vec![
                ConnectionRecord::new("alb", "alb", "alb-404"),
                ConnectionRecord::new("alb", "alb", "alb-1"),
            ],
        )]));
        let payload = resolve_payload(&scan.entities[0].data[0], &scan);
        assert_eq!(payload.get("alb"), Some(&json!([{"id": "alb-1"}])));
    }

    #[test]
    fn resolution_is_idempotent() {
        let scan = scan(ConnectionIndex::from([(
            "i-1".to_string(),
            vec![ConnectionRecord::new("alb", "alb", "alb-1")],
        )]));
        let resolver = ConnectionResolver::new(&scan);
        let first = resolver.resolve_all(&scan.entities[0].data);
        let second = resolver.resolve_all(&scan.entities[0].data);
        assert_eq!(first, second);
    }
}

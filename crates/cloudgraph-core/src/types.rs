// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the plugin resolver, graph builder, and ingestion pipeline.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Namespace used when a provider spec carries no `namespace/` prefix.
pub const DEFAULT_NAMESPACE: &str = "@cloudgraph";

/// Field of a [`FormattedEntity`] holding its provider-defined identifier.
pub const ENTITY_ID_FIELD: &str = "id";

/// A provider identifier as typed by the user: `name` or `namespace/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderSpec {
    pub namespace: String,
    pub name: String,
}

impl ProviderSpec {
    /// Parse a spec using [`DEFAULT_NAMESPACE`] when no separator is present.
    pub fn parse(input: &str) -> Self {
        Self::parse_with_namespace(input, DEFAULT_NAMESPACE)
    }

    /// Parse a spec, falling back to `default_namespace`.
    ///
    /// Only the first `/` separates namespace from name.
    pub fn parse_with_namespace(input: &str, default_namespace: &str) -> Self {
        match input.split_once('/') {
            Some((namespace, name)) => Self {
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
            None => Self {
                namespace: default_namespace.to_string(),
                name: input.to_string(),
            },
        }
    }

    /// Package path of the plugin backing this provider: `<namespace>/cg-provider-<name>`.
    pub fn import_path(&self) -> String {
        format!("{}/cg-provider-{}", self.namespace, self.name)
    }
}

impl fmt::Display for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Health status reported by storage engine health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Engine is fully operational.
    Healthy,
    /// Engine is not reachable or not operational.
    Unhealthy(String),
}

impl HealthStatus {
    /// Only a fully healthy engine accepts schema and data pushes.
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// How entries returned by connection builders are merged into the scan's connection index.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ConnectionMerge {
    /// A later entry for an identifier replaces the earlier one.
    #[default]
    LastWriteWins,
    /// The first entry for an identifier is kept.
    FirstWriteWins,
    /// Records for the same identifier are concatenated in discovery order.
    Append,
}

/// Options forwarded to every provider capability call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    pub debug: bool,
    pub dev_mode: bool,
}

/// Opaque credentials produced by a provider plugin.
pub type Credentials = Value;

/// Identity of the scanned account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub account_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            extra: Map::new(),
        }
    }
}

/// Static properties a provider plugin declares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderProperties {
    /// Regions the provider can scan.
    pub regions: Vec<String>,
    /// Supported services, keyed by a display key, valued by service name.
    pub services: BTreeMap<String, String>,
}

/// Arguments for a provider's bulk data fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub regions: Vec<String>,
    pub resources: Vec<String>,
    pub credentials: Credentials,
    pub options: ScanOptions,
}

/// Raw data for one service, partitioned by region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceData {
    pub name: String,
    pub data: BTreeMap<String, Vec<Value>>,
}

/// Input to a service module's format function.
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    pub instance: &'a Value,
    pub region: &'a str,
    pub account: &'a str,
}

/// Input to a service module's connection builder.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionContext<'a> {
    pub instance: &'a Value,
    pub region: &'a str,
    pub account: &'a str,
    pub full_dataset: &'a [ServiceData],
}

/// The provider-normalized representation of one scanned resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormattedEntity(pub Map<String, Value>);

impl FormattedEntity {
    /// The identifier used as the join key for connections.
    pub fn id(&self) -> Option<&str> {
        self.0.get(ENTITY_ID_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for FormattedEntity {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for FormattedEntity {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

/// A directed relationship from the keyed entity to a target entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    /// Field on the source payload that receives the target.
    pub relation_field: String,
    pub target_resource_type: String,
    pub target_identifier: String,
}

impl ConnectionRecord {
    pub fn new(
        relation_field: impl Into<String>,
        target_resource_type: impl Into<String>,
        target_identifier: impl Into<String>,
    ) -> Self {
        Self {
            relation_field: relation_field.into(),
            target_resource_type: target_resource_type.into(),
            target_identifier: target_identifier.into(),
        }
    }
}

/// Source identifier to the connections discovered for it.
pub type ConnectionIndex = BTreeMap<String, Vec<ConnectionRecord>>;

/// Formatted entities of one service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityGroup {
    #[serde(rename = "name")]
    pub service_name: String,
    pub data: Vec<FormattedEntity>,
}

/// Everything one (provider, account) scan produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub entities: Vec<EntityGroup>,
    pub connections: ConnectionIndex,
}

impl ScanResult {
    /// Total number of formatted entities across all services.
    pub fn entity_count(&self) -> usize {
        self.entities.iter().map(|group| group.data.len()).sum()
    }
}

/// A formatted entity enriched with its resolved connection targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectedEntityPayload(pub Map<String, Value>);

impl ConnectedEntityPayload {
    /// Start from the base entity with no relation fields attached.
    pub fn from_entity(entity: &FormattedEntity) -> Self {
        Self(entity.0.clone())
    }

    /// Append `target` to the list under `field`, creating the list if needed.
    ///
    /// A non-list value already stored under `field` is replaced.
    pub fn push_relation(&mut self, field: &str, target: &FormattedEntity) {
        let slot = self
            .0
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(targets) = slot {
            targets.push(Value::Object(target.0.clone()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

/// Individual provider-declared graph type definitions.
pub type SchemaFragment = String;

/// Aggregated schema submitted to storage once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDocument {
    pub fragments: Vec<SchemaFragment>,
}

impl SchemaDocument {
    pub fn extend(&mut self, fragments: impl IntoIterator<Item = SchemaFragment>) {
        self.fragments.extend(fragments);
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Render the document as one schema text, fragments separated by newlines.
    pub fn render(&self) -> String {
        self.fragments.join("\n")
    }
}

impl From<Vec<SchemaFragment>> for SchemaDocument {
    fn from(fragments: Vec<SchemaFragment>) -> Self {
        Self { fragments }
    }
}

/// Variables of an ingestion push.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushVariables {
    pub input: Vec<ConnectedEntityPayload>,
}

/// One ingestion call: a mutation plus the payloads it carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushRequest {
    pub query: String,
    pub variables: PushVariables,
}

impl PushRequest {
    pub fn new(mutation: impl Into<String>, input: Vec<ConnectedEntityPayload>) -> Self {
        Self {
            query: mutation.into(),
            variables: PushVariables { input },
        }
    }
}

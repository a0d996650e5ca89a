// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider plugin for deterministic testing.
//!
//! `MockPlugin` implements `ProviderPlugin` over pre-configured raw data,
//! filtering it by the requested regions and resources the way a real
//! provider would.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use cloudgraph_core::types::{
    ConnectionContext, ConnectionIndex, Credentials, DataRequest, FormatContext, Identity,
    ProviderProperties, ScanOptions, SchemaFragment, ServiceData,
};
use cloudgraph_core::{CloudGraphError, FormattedEntity, ProviderPlugin, ServiceModule};

type ConnectionBuilder =
    Arc<dyn Fn(&ConnectionContext<'_>) -> Option<ConnectionIndex> + Send + Sync>;

/// A mock service module.
///
/// `format` passes object instances through (non-objects are wrapped under
/// `value`), optionally stamping `region` and `account` onto the entity.
#[derive(Clone)]
pub struct MockService {
    mutation: String,
    annotate: bool,
    connections: Option<ConnectionBuilder>,
}

impl MockService {
    pub fn new(mutation: impl Into<String>) -> Self {
        Self {
            mutation: mutation.into(),
            annotate: false,
            connections: None,
        }
    }

    /// Stamp `region` and `account` fields onto formatted entities.
    pub fn annotated(mut self) -> Self {
        self.annotate = true;
        self
    }

    /// Install a connection builder.
    pub fn with_connections<F>(mut self, builder: F) -> Self
    where
        F: Fn(&ConnectionContext<'_>) -> Option<ConnectionIndex> + Send + Sync + 'static,
    {
        self.connections = Some(Arc::new(builder));
        self
    }
}

impl std::fmt::Debug for MockService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockService")
            .field("mutation", &self.mutation)
            .field("annotate", &self.annotate)
            .field("connections", &self.connections.is_some())
            .finish()
    }
}

impl ServiceModule for MockService {
    fn format(&self, ctx: &FormatContext<'_>) -> FormattedEntity {
        let mut entity = match ctx.instance {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other.clone());
                map
            }
        };
        if self.annotate {
            entity.insert("region".to_string(), Value::String(ctx.region.to_string()));
            entity.insert("account".to_string(), Value::String(ctx.account.to_string()));
        }
        FormattedEntity(entity)
    }

    fn connections(&self, ctx: &ConnectionContext<'_>) -> Option<ConnectionIndex> {
        self.connections.as_ref().and_then(|builder| builder(ctx))
    }

    fn mutation(&self) -> &str {
        &self.mutation
    }
}

/// A mock provider plugin serving pre-configured raw data.
pub struct MockPlugin {
    name: String,
    schema: Vec<SchemaFragment>,
    services: HashMap<String, Arc<MockService>>,
    properties: ProviderProperties,
    data: Vec<ServiceData>,
    account: String,
    fail_credentials: bool,
    requests: Mutex<Vec<DataRequest>>,
}

impl MockPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Vec::new(),
            services: HashMap::new(),
            properties: ProviderProperties::default(),
            data: Vec::new(),
            account: "000000000000".to_string(),
            fail_credentials: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_schema(mut self, fragment: impl Into<SchemaFragment>) -> Self {
        self.schema.push(fragment.into());
        self
    }

    /// Register a service module; the service becomes a supported service.
    pub fn with_service(mut self, name: impl Into<String>, service: MockService) -> Self {
        let name = name.into();
        self.properties.services.insert(name.clone(), name.clone());
        self.services.insert(name, Arc::new(service));
        self
    }

    /// Add raw instances for `service` in `region`; the region becomes supported.
    pub fn with_region_data(
        mut self,
        service: impl Into<String>,
        region: impl Into<String>,
        instances: Vec<Value>,
    ) -> Self {
        let service = service.into();
        let region = region.into();
        if !self.properties.regions.contains(&region) {
            self.properties.regions.push(region.clone());
        }
        let position = self.data.iter().position(|block| block.name == service);
        let block = match position {
            Some(index) => &mut self.data[index],
            None => {
                self.data.push(ServiceData {
                    name: service,
                    data: Default::default(),
                });
                let last = self.data.len() - 1;
                &mut self.data[last]
            }
        };
        block.data.entry(region).or_default().extend(instances);
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    /// Make credential acquisition fail.
    pub fn failing_credentials(mut self) -> Self {
        self.fail_credentials = true;
        self
    }

    /// Every data request received so far.
    pub async fn data_requests(&self) -> Vec<DataRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ProviderPlugin for MockPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> Vec<SchemaFragment> {
        self.schema.clone()
    }

    fn service(&self, name: &str) -> Option<Arc<dyn ServiceModule>> {
        self.services
            .get(name)
            .map(|service| Arc::clone(service) as Arc<dyn ServiceModule>)
    }

    fn properties(&self) -> ProviderProperties {
        self.properties.clone()
    }

    async fn credentials(&self, _opts: &ScanOptions) -> Result<Credentials, CloudGraphError> {
        if self.fail_credentials {
            return Err(CloudGraphError::Provider {
                provider: self.name.clone(),
                message: "no credentials available".to_string(),
                source: None,
            });
        }
        Ok(serde_json::json!({ "token": "mock" }))
    }

    async fn identity(
        &self,
        _credentials: &Credentials,
        _opts: &ScanOptions,
    ) -> Result<Identity, CloudGraphError> {
        Ok(Identity::new(self.account.clone()))
    }

    async fn data(&self, request: DataRequest) -> Result<Vec<ServiceData>, CloudGraphError> {
        let blocks = self
            .data
            .iter()
            .filter(|block| request.resources.is_empty() || request.resources.contains(&block.name))
            .map(|block| ServiceData {
                name: block.name.clone(),
                data: block
                    .data
                    .iter()
                    .filter(|(region, _)| {
                        request.regions.is_empty() || request.regions.contains(region)
                    })
                    .map(|(region, instances)| (region.clone(), instances.clone()))
                    .collect(),
            })
            .collect();
        self.requests.lock().await.push(request);
        Ok(blocks)
    }
}

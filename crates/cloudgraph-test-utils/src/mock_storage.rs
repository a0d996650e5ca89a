// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock storage engine for deterministic testing.
//!
//! `MockStorage` implements `StorageEngine` in memory and records every
//! schema-set and push call so tests can assert on what was submitted.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use cloudgraph_core::{CloudGraphError, HealthStatus, PushRequest, SchemaDocument, StorageEngine};

/// A mock storage engine with configurable health and failures.
pub struct MockStorage {
    host: String,
    health: HealthStatus,
    schema_error: Option<String>,
    failing_mutations: HashSet<String>,
    push_delay: Option<Duration>,
    health_checks: AtomicUsize,
    schemas: Mutex<Vec<SchemaDocument>>,
    pushes: Mutex<Vec<PushRequest>>,
}

impl MockStorage {
    /// A healthy engine that accepts everything.
    pub fn new() -> Self {
        Self {
            host: "http://mock-storage".to_string(),
            health: HealthStatus::Healthy,
            schema_error: None,
            failing_mutations: HashSet::new(),
            push_delay: None,
            health_checks: AtomicUsize::new(0),
            schemas: Mutex::new(Vec::new()),
            pushes: Mutex::new(Vec::new()),
        }
    }

    /// An engine whose health check reports unhealthy.
    pub fn unhealthy(reason: impl Into<String>) -> Self {
        Self {
            health: HealthStatus::Unhealthy(reason.into()),
            ..Self::new()
        }
    }

    /// Reject every schema-set call with `message`.
    pub fn failing_schema(mut self, message: impl Into<String>) -> Self {
        self.schema_error = Some(message.into());
        self
    }

    /// Reject pushes carrying `mutation`.
    pub fn failing_mutation(mut self, mutation: impl Into<String>) -> Self {
        self.failing_mutations.insert(mutation.into());
        self
    }

    /// Hold every push for `delay` before answering.
    pub fn with_push_delay(mut self, delay: Duration) -> Self {
        self.push_delay = Some(delay);
        self
    }

    pub fn health_checks(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }

    /// Every schema submitted so far, accepted or not.
    pub async fn schemas(&self) -> Vec<SchemaDocument> {
        self.schemas.lock().await.clone()
    }

    /// Every push submitted so far, accepted or not.
    pub async fn pushes(&self) -> Vec<PushRequest> {
        self.pushes.lock().await.clone()
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageEngine for MockStorage {
    fn host(&self) -> &str {
        &self.host
    }

    async fn health_check(&self) -> Result<HealthStatus, CloudGraphError> {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.health.clone())
    }

    async fn set_schema(&self, schema: &SchemaDocument) -> Result<(), CloudGraphError> {
        self.schemas.lock().await.push(schema.clone());
        match &self.schema_error {
            Some(message) => Err(CloudGraphError::Storage {
                message: message.clone(),
                source: None,
            }),
            None => Ok(()),
        }
    }

    async fn push(&self, request: PushRequest) -> Result<(), CloudGraphError> {
        let rejected = self.failing_mutations.contains(&request.query);
        let mutation = request.query.clone();
        self.pushes.lock().await.push(request);
        if let Some(delay) = self.push_delay {
            tokio::time::sleep(delay).await;
        }
        if rejected {
            return Err(CloudGraphError::Storage {
                message: format!("mutation {mutation} rejected"),
                source: None,
            });
        }
        Ok(())
    }
}

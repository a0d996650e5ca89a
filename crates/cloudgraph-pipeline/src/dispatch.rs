// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion dispatch: one concurrent push per (provider, service) group.
//!
//! Pushes run on a [`JoinSet`]. [`IngestionDispatcher::wait`] collects every
//! outcome before returning, so one rejected push never hides the others.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use cloudgraph_core::{CloudGraphError, ProviderPlugin, PushRequest, ScanResult, StorageEngine};
use cloudgraph_graph::ConnectionResolver;
use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Identifies one ingestion push.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceKey {
    pub provider: String,
    pub service: String,
}

impl ServiceKey {
    pub fn new(provider: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            service: service.into(),
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.service)
    }
}

/// A push that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionFailure {
    pub provider: String,
    pub service: String,
    pub message: String,
}

impl IngestionFailure {
    fn new(key: ServiceKey, message: impl Into<String>) -> Self {
        Self {
            provider: key.provider,
            service: key.service,
            message: message.into(),
        }
    }
}

impl fmt::Display for IngestionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.provider, self.service, self.message)
    }
}

/// Outcome of every push issued during one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionReport {
    pub succeeded: Vec<ServiceKey>,
    pub failed: Vec<IngestionFailure>,
}

impl IngestionReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of pushes that completed, either way.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Any failure becomes [`CloudGraphError::Ingestion`] naming every failed service.
    pub fn into_result(self) -> Result<Self, CloudGraphError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(CloudGraphError::Ingestion {
            failures: self.failed.iter().map(ToString::to_string).collect(),
        })
    }
}

/// Issues ingestion pushes and collects their outcomes.
pub struct IngestionDispatcher {
    storage: Arc<dyn StorageEngine>,
    healthy: bool,
    cancel: CancellationToken,
    tasks: JoinSet<Result<ServiceKey, IngestionFailure>>,
    in_flight: HashMap<Id, ServiceKey>,
    failed_early: Vec<IngestionFailure>,
}

impl fmt::Debug for IngestionDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionDispatcher")
            .field("host", &self.storage.host())
            .field("healthy", &self.healthy)
            .field("pending", &self.tasks.len())
            .finish()
    }
}

impl IngestionDispatcher {
    /// `healthy` is the storage health read once at the start of the command.
    pub fn new(storage: Arc<dyn StorageEngine>, healthy: bool, cancel: CancellationToken) -> Self {
        Self {
            storage,
            healthy,
            cancel,
            tasks: JoinSet::new(),
            in_flight: HashMap::new(),
            failed_early: Vec::new(),
        }
    }

    /// Pushes issued and not yet collected.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Issue one push per entity group of `scan` and return how many were issued.
    ///
    /// Nothing is issued while storage is unhealthy. A group whose service the
    /// plugin does not know is recorded as a failure for that service.
    pub fn dispatch(&mut self, provider: &str, plugin: &dyn ProviderPlugin, scan: &ScanResult) -> usize {
        if !self.healthy {
            debug!(provider, "storage unhealthy, skipping ingestion");
            return 0;
        }

        let resolver = ConnectionResolver::new(scan);
        let mut issued = 0;
        for group in &scan.entities {
            let key = ServiceKey::new(provider, &group.service_name);
            let Some(service) = plugin.service(&group.service_name) else {
                error!(provider, service = %group.service_name, "no service module for {key}");
                self.failed_early
                    .push(IngestionFailure::new(key, "no service module in provider plugin"));
                continue;
            };

            info!(provider, service = %group.service_name, "connecting service: {}", group.service_name);
            let request = PushRequest::new(service.mutation(), resolver.resolve_all(&group.data));
            debug!(provider, service = %group.service_name, count = group.data.len(), "issuing push");

            let storage = Arc::clone(&self.storage);
            let cancel = self.cancel.clone();
            let task_key = key.clone();
            let handle = self.tasks.spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => Err(IngestionFailure::new(task_key, "cancelled")),
                    pushed = storage.push(request) => match pushed {
                        Ok(()) => Ok(task_key),
                        Err(e) => Err(IngestionFailure::new(task_key, e.to_string())),
                    },
                }
            });
            self.in_flight.insert(handle.id(), key);
            issued += 1;
        }
        issued
    }

    /// Wait for every issued push and report each outcome.
    pub async fn wait(mut self) -> IngestionReport {
        let mut report = IngestionReport {
            succeeded: Vec::new(),
            failed: std::mem::take(&mut self.failed_early),
        };

        while let Some(joined) = self.tasks.join_next_with_id().await {
            match joined {
                Ok((id, Ok(key))) => {
                    self.in_flight.remove(&id);
                    debug!(service = %key, "push succeeded");
                    report.succeeded.push(key);
                }
                Ok((id, Err(failure))) => {
                    self.in_flight.remove(&id);
                    error!(failure = %failure, "push failed");
                    report.failed.push(failure);
                }
                Err(join_error) => {
                    let key = self
                        .in_flight
                        .remove(&join_error.id())
                        .unwrap_or_else(|| ServiceKey::new("unknown", "unknown"));
                    error!(service = %key, error = %join_error, "push task aborted");
                    report.failed.push(IngestionFailure::new(key, join_error.to_string()));
                }
            }
        }

        report.succeeded.sort();
        report
            .failed
            .sort_by(|a, b| (&a.provider, &a.service).cmp(&(&b.provider, &b.service)));
        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "ingestion finished"
        );
        report
    }
}

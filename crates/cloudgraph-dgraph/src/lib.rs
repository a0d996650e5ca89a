// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dgraph storage engine for cloudgraph.
//!
//! Talks to a Dgraph GraphQL endpoint over HTTP:
//!
//! - `GET /health` for the health check,
//! - `POST /admin/schema` with the combined schema text,
//! - `POST /graphql` with `{query, variables: {input}}` for every push.

use std::time::Duration;

use async_trait::async_trait;
use cloudgraph_core::{CloudGraphError, HealthStatus, PushRequest, SchemaDocument, StorageEngine};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, warn};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// GraphQL error entry in a Dgraph response body.
#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// The part of a Dgraph response body this client inspects.
#[derive(Debug, Default, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

/// HTTP client for a Dgraph GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct DgraphEngine {
    client: reqwest::Client,
    host: String,
}

impl DgraphEngine {
    /// Creates a client for `host` (e.g. `http://localhost:8997`).
    pub fn new(host: impl Into<String>) -> Result<Self, CloudGraphError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CloudGraphError::Storage {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.host)
    }

    /// Sends a request and turns a non-2xx status or GraphQL `errors` into an error.
    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<(), CloudGraphError> {
        let response = request.send().await.map_err(|e| CloudGraphError::Storage {
            message: format!("{what} request to {} failed: {e}", self.host),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| CloudGraphError::Storage {
            message: format!("{what} response from {} could not be read: {e}", self.host),
            source: Some(Box::new(e)),
        })?;
        debug!(status = %status, what, "storage response received");

        if !status.is_success() {
            return Err(CloudGraphError::Storage {
                message: format!("{what} returned {status}: {body}"),
                source: None,
            });
        }

        let parsed = serde_json::from_str::<GraphqlResponse>(&body).unwrap_or_default();
        if !parsed.errors.is_empty() {
            let messages: Vec<&str> = parsed.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(CloudGraphError::Storage {
                message: format!("{what} rejected: {}", messages.join("; ")),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StorageEngine for DgraphEngine {
    fn host(&self) -> &str {
        &self.host
    }

    async fn health_check(&self) -> Result<HealthStatus, CloudGraphError> {
        match self.client.get(self.url("/health")).send().await {
            Ok(response) if response.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(response) => {
                let status = response.status();
                warn!(host = %self.host, status = %status, "storage health check failed");
                Ok(HealthStatus::Unhealthy(format!("health endpoint returned {status}")))
            }
            Err(e) => {
                warn!(host = %self.host, error = %e, "storage engine unreachable");
                Ok(HealthStatus::Unhealthy(e.to_string()))
            }
        }
    }

    async fn set_schema(&self, schema: &SchemaDocument) -> Result<(), CloudGraphError> {
        let request = self
            .client
            .post(self.url("/admin/schema"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/graphql"))
            .body(schema.render());
        self.send(request, "schema update").await
    }

    async fn push(&self, request: PushRequest) -> Result<(), CloudGraphError> {
        let count = request.variables.input.len();
        let http = self.client.post(self.url("/graphql")).json(&request);
        self.send(http, "mutation").await?;
        debug!(count, "pushed entities");
        Ok(())
    }
}

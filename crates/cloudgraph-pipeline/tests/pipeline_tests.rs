// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the scan and load command flows.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use cloudgraph_config::{CloudGraphConfig, ProviderConfig};
use cloudgraph_core::{
    CloudGraphError, ConnectionIndex, ConnectionRecord, PushRequest, ScanOptions, ScanResult,
};
use cloudgraph_graph::{ArtifactCandidate, ArtifactStore};
use cloudgraph_pipeline::{load, scan, ArtifactSelector, NewestArtifact, RunContext, SchemaPushOutcome};
use cloudgraph_plugin::{LockStore, PluginManifest, PluginResolver, ResolverMode};
use cloudgraph_test_utils::{MemoryInstaller, MockPlugin, MockService, MockStorage};
use serde_json::json;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn ec2_service() -> MockService {
    MockService::new("addAwsEc2").with_connections(|ctx| {
        let id = ctx.instance.get("id")?.as_str()?;
        let lb = ctx.instance.get("lb")?.as_str()?;
        Some(ConnectionIndex::from([(
            id.to_string(),
            vec![ConnectionRecord::new("alb", "alb", lb)],
        )]))
    })
}

fn aws_plugin() -> MockPlugin {
    MockPlugin::new("aws")
        .with_account("123456")
        .with_schema("type awsEc2 { id: String! @id }")
        .with_schema("type awsAlb { id: String! @id }")
        .with_service("ec2", ec2_service())
        .with_service("alb", MockService::new("addAwsAlb"))
        .with_region_data("ec2", "us-east-1", vec![json!({"id": "i-1", "lb": "alb-1"})])
        .with_region_data("ec2", "eu-west-1", vec![json!({"id": "i-2"})])
        .with_region_data("alb", "us-east-1", vec![json!({"id": "alb-1"})])
}

fn gcp_plugin() -> MockPlugin {
    MockPlugin::new("gcp")
        .with_account("proj")
        .with_schema("type gcpVm { id: String! @id }")
        .with_service("vm", MockService::new("addGcpVm"))
        .with_region_data("vm", "us-central1", vec![json!({"id": "vm-1"})])
}

struct Harness {
    dir: TempDir,
    config: CloudGraphConfig,
    installer: MemoryInstaller,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CloudGraphConfig::default();
        config.cloud_graph.data_dir = dir.path().join("cg-data").display().to_string();
        config.cloud_graph.config_dir = dir.path().join("config").display().to_string();
        Self {
            dir,
            config,
            installer: MemoryInstaller::new(),
        }
    }

    fn with_plugin(self, plugin: Arc<MockPlugin>) -> Self {
        self.with_manifest(plugin, None)
    }

    fn with_manifest(mut self, plugin: Arc<MockPlugin>, host_range: Option<&str>) -> Self {
        use cloudgraph_core::ProviderPlugin;
        let import_path = format!("@cloudgraph/cg-provider-{}", plugin.name());
        let manifest = match host_range {
            Some(range) => PluginManifest::new(import_path, "1.0.0").requiring_host(range),
            None => PluginManifest::new(import_path, "1.0.0"),
        };
        self.installer = self.installer.with_package(manifest, plugin);
        self
    }

    fn with_provider_config(mut self, name: &str, provider: ProviderConfig) -> Self {
        self.config.providers.insert(name.to_string(), provider);
        self
    }

    fn artifacts(&self) -> ArtifactStore {
        ArtifactStore::new(self.dir.path().join("cg-data"))
    }

    fn context(self, storage: Arc<MockStorage>) -> (RunContext, TempDir) {
        let lock = LockStore::new(self.config.lock_path());
        let resolver = PluginResolver::new(
            ResolverMode::Production,
            semver::Version::new(0, 1, 0),
            lock,
            Arc::new(self.installer),
        );
        let ctx = RunContext::new(
            self.config,
            resolver,
            storage,
            ScanOptions::default(),
            CancellationToken::new(),
        );
        (ctx, self.dir)
    }
}

fn args(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn push_for<'a>(pushes: &'a [PushRequest], mutation: &str) -> &'a PushRequest {
    pushes
        .iter()
        .find(|push| push.query == mutation)
        .unwrap_or_else(|| panic!("no push for {mutation}"))
}

#[tokio::test]
async fn scan_persists_artifact_and_ingests_connected_payloads() {
    let storage = Arc::new(MockStorage::new());
    let (ctx, dir) = Harness::new()
        .with_plugin(Arc::new(aws_plugin()))
        .context(Arc::clone(&storage));

    let summary = scan(&ctx, &args(&["aws"])).await.unwrap();

    assert!(summary.stored);
    assert_eq!(summary.schema, SchemaPushOutcome::Applied);
    assert_eq!(summary.artifacts.len(), 1);
    assert!(summary.artifacts[0].exists());
    assert!(summary.artifacts[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("aws_123456_"));
    assert!(dir.path().join("cg-data/aws_schema.graphql").exists());
    assert!(dir.path().join("cg-data/schema.graphql").exists());

    let schemas = storage.schemas().await;
    assert_eq!(schemas.len(), 1);
    assert_eq!(schemas[0].len(), 2);

    let pushes = storage.pushes().await;
    assert_eq!(pushes.len(), 2);
    let ec2 = push_for(&pushes, "addAwsEc2");
    assert_eq!(ec2.variables.input.len(), 2);
    let connected = ec2
        .variables
        .input
        .iter()
        .find(|payload| payload.get("id") == Some(&json!("i-1")))
        .unwrap();
    assert_eq!(connected.get("alb"), Some(&json!([{"id": "alb-1"}])));
    assert_eq!(summary.ingestion.succeeded.len(), 2);
}

#[tokio::test]
async fn scan_with_unhealthy_storage_still_writes_artifact() {
    let storage = Arc::new(MockStorage::unhealthy("connection refused"));
    let (ctx, _dir) = Harness::new()
        .with_plugin(Arc::new(aws_plugin()))
        .context(Arc::clone(&storage));

    let summary = scan(&ctx, &args(&["aws"])).await.unwrap();

    assert!(!summary.stored);
    assert_eq!(summary.schema, SchemaPushOutcome::Skipped);
    assert!(summary.artifacts[0].exists());
    assert!(storage.pushes().await.is_empty());
    assert!(storage.schemas().await.is_empty());
    assert_eq!(storage.health_checks(), 1);
}

#[tokio::test]
async fn load_with_unhealthy_storage_is_fatal() {
    let storage = Arc::new(MockStorage::unhealthy("connection refused"));
    let harness = Harness::new().with_plugin(Arc::new(aws_plugin()));
    harness
        .artifacts()
        .write_scan_at("aws", "123456", 1, &ScanResult::default())
        .unwrap();
    let (ctx, _dir) = harness.context(Arc::clone(&storage));

    let err = load(&ctx, &args(&["aws"]), &NewestArtifact).await.unwrap_err();

    match err {
        CloudGraphError::StorageUnavailable { host, reason } => {
            assert_eq!(host, "http://mock-storage");
            assert_eq!(reason, "connection refused");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(storage.pushes().await.is_empty());
    assert!(storage.schemas().await.is_empty());
}

#[tokio::test]
async fn scan_then_load_pushes_the_same_payloads() {
    let scanned = Arc::new(MockStorage::new());
    let harness = Harness::new().with_plugin(Arc::new(aws_plugin()));
    let config = harness.config.clone();
    let (ctx, dir) = harness.context(Arc::clone(&scanned));
    scan(&ctx, &args(&["aws"])).await.unwrap();
    drop(ctx);

    let loaded = Arc::new(MockStorage::new());
    let mut harness = Harness::new().with_plugin(Arc::new(aws_plugin()));
    harness.config = config;
    let (ctx, _other) = harness.context(Arc::clone(&loaded));
    let summary = load(&ctx, &args(&["aws"]), &NewestArtifact).await.unwrap();

    assert_eq!(summary.artifacts.len(), 1);
    assert!(summary.artifacts[0].starts_with(dir.path()));

    let mut before = scanned.pushes().await;
    let mut after = loaded.pushes().await;
    before.sort_by(|a, b| a.query.cmp(&b.query));
    after.sort_by(|a, b| a.query.cmp(&b.query));
    assert_eq!(before, after);
}

#[tokio::test]
async fn load_missing_data_aborts_before_any_push() {
    let storage = Arc::new(MockStorage::new());
    let harness = Harness::new()
        .with_plugin(Arc::new(aws_plugin()))
        .with_plugin(Arc::new(gcp_plugin()));
    harness
        .artifacts()
        .write_scan_at("aws", "123456", 1, &ScanResult::default())
        .unwrap();
    let (ctx, _dir) = harness.context(Arc::clone(&storage));

    let err = load(&ctx, &args(&["aws", "gcp"]), &NewestArtifact).await.unwrap_err();

    assert!(matches!(err, CloudGraphError::MissingScanData { ref provider } if provider == "gcp"));
    assert!(err.to_string().contains("cg scan gcp"));
    assert!(storage.pushes().await.is_empty());
}

struct OldestArtifact {
    offered: Mutex<Vec<usize>>,
}

impl ArtifactSelector for OldestArtifact {
    fn select(&self, _provider: &str, candidates: &[ArtifactCandidate]) -> Result<PathBuf, CloudGraphError> {
        self.offered.lock().unwrap().push(candidates.len());
        Ok(candidates[candidates.len() - 1].path.clone())
    }
}

#[tokio::test]
async fn load_asks_selector_only_when_several_artifacts_exist() {
    let storage = Arc::new(MockStorage::new());
    let harness = Harness::new().with_plugin(Arc::new(aws_plugin()));
    let store = harness.artifacts();
    let old = store.write_scan_at("aws", "123456", 1_000, &ScanResult::default()).unwrap();
    store.write_scan_at("aws", "123456", 2_000, &ScanResult::default()).unwrap();
    let (ctx, _dir) = harness.context(Arc::clone(&storage));

    let selector = OldestArtifact {
        offered: Mutex::new(Vec::new()),
    };
    let summary = load(&ctx, &args(&["aws"]), &selector).await.unwrap();

    assert_eq!(summary.artifacts, vec![old]);
    assert_eq!(*selector.offered.lock().unwrap(), vec![2]);
}

#[tokio::test]
async fn schema_push_failure_is_logged_and_scan_continues() {
    let storage = Arc::new(MockStorage::new().failing_schema("invalid schema"));
    let (ctx, _dir) = Harness::new()
        .with_plugin(Arc::new(aws_plugin()))
        .context(Arc::clone(&storage));

    let summary = scan(&ctx, &args(&["aws"])).await.unwrap();

    assert!(matches!(summary.schema, SchemaPushOutcome::Failed(ref m) if m.contains("invalid schema")));
    assert_eq!(storage.pushes().await.len(), 2);
}

#[tokio::test]
async fn ingestion_failure_names_service_after_all_pushes() {
    let storage = Arc::new(MockStorage::new().failing_mutation("addAwsAlb"));
    let (ctx, _dir) = Harness::new()
        .with_plugin(Arc::new(aws_plugin()))
        .with_plugin(Arc::new(gcp_plugin()))
        .context(Arc::clone(&storage));

    let err = scan(&ctx, &args(&["aws", "gcp"])).await.unwrap_err();

    match err {
        CloudGraphError::Ingestion { failures } => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].starts_with("aws/alb"));
        }
        other => panic!("unexpected {other:?}"),
    }
    // Every other push still ran.
    assert_eq!(storage.pushes().await.len(), 3);
}

#[tokio::test]
async fn provider_config_restricts_regions_and_defaults_resources() {
    let storage = Arc::new(MockStorage::new());
    let plugin = Arc::new(aws_plugin());
    let (ctx, _dir) = Harness::new()
        .with_plugin(Arc::clone(&plugin))
        .with_provider_config(
            "aws",
            ProviderConfig {
                regions: vec!["eu-west-1".into()],
                resources: Vec::new(),
            },
        )
        .context(Arc::clone(&storage));

    // No arguments: providers come from the config.
    scan(&ctx, &[]).await.unwrap();

    let requests = plugin.data_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].regions, vec!["eu-west-1"]);
    assert_eq!(requests[0].resources, vec!["alb", "ec2"]);

    let pushes = storage.pushes().await;
    let ec2 = push_for(&pushes, "addAwsEc2");
    assert_eq!(ec2.variables.input.len(), 1);
    assert_eq!(ec2.variables.input[0].get("id"), Some(&json!("i-2")));
}

#[tokio::test]
async fn no_providers_is_fatal() {
    let storage = Arc::new(MockStorage::new());
    let (ctx, _dir) = Harness::new().context(Arc::clone(&storage));

    let err = scan(&ctx, &[]).await.unwrap_err();
    assert!(matches!(err, CloudGraphError::NoProvidersConfigured));
    let err = load(&ctx, &[], &NewestArtifact).await.unwrap_err();
    assert!(matches!(err, CloudGraphError::NoProvidersConfigured));
}

#[tokio::test]
async fn incompatible_plugin_aborts_before_scanning() {
    let storage = Arc::new(MockStorage::new());
    let plugin = Arc::new(aws_plugin());
    let (ctx, dir) = Harness::new()
        .with_manifest(Arc::clone(&plugin), Some("^9.0.0"))
        .context(Arc::clone(&storage));

    let err = scan(&ctx, &args(&["aws"])).await.unwrap_err();

    assert!(matches!(err, CloudGraphError::VersionMismatch { .. }));
    assert!(plugin.data_requests().await.is_empty());
    assert!(!dir.path().join("cg-data").exists());
    assert!(storage.pushes().await.is_empty());
}

#[tokio::test]
async fn production_resolution_pins_every_provider() {
    let storage = Arc::new(MockStorage::new());
    let (ctx, dir) = Harness::new()
        .with_plugin(Arc::new(aws_plugin()))
        .with_plugin(Arc::new(gcp_plugin()))
        .context(Arc::clone(&storage));

    scan(&ctx, &args(&["aws", "gcp"])).await.unwrap();

    let lock: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("config/.cloud-graph.lock.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(lock, json!({"aws": "latest", "gcp": "latest"}));
}

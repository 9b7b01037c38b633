//! Tests for the connection facade, strategies and candidate resolution

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

use ovirt_provision_core::{
    ClusterHandle, LiveAdapter, NicSpec, ProvisionError, Result, VmHandle, EMPTY_NETWORK,
};

use crate::candidates::{list_candidates, LegacyNetworkSource};
use crate::manager::{
    with_connection, ApiVersion, ClusterNetwork, Manager, ManagerConnection, VnicProfile,
};
use crate::strategy::{strategy_for, VersionStrategy};

/// Connection double backed by canned listings
#[derive(Default)]
struct FakeConnection {
    profiles: Vec<VnicProfile>,
    networks: Vec<ClusterNetwork>,
    named_networks: Vec<(String, String)>,
    closes: Arc<AtomicUsize>,
    fail_close: bool,
}

#[async_trait]
impl ManagerConnection for FakeConnection {
    async fn list_nics(&self, _vm: &VmHandle) -> Result<Vec<LiveAdapter>> {
        Ok(Vec::new())
    }

    async fn create_nic(&self, _vm: &VmHandle, _spec: &NicSpec) -> Result<()> {
        Ok(())
    }

    async fn update_nic(&self, _vm: &VmHandle, _nic_id: &str, _spec: &NicSpec) -> Result<()> {
        Ok(())
    }

    async fn remove_nic(&self, _vm: &VmHandle, _nic_id: &str) -> Result<()> {
        Ok(())
    }

    async fn list_vnic_profiles(&self) -> Result<Vec<VnicProfile>> {
        Ok(self.profiles.clone())
    }

    async fn list_cluster_networks(&self, _cluster: &ClusterHandle) -> Result<Vec<ClusterNetwork>> {
        Ok(self.networks.clone())
    }

    async fn find_network_id(
        &self,
        _cluster: &ClusterHandle,
        name: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .named_networks
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| id.clone()))
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            Err(ProvisionError::remote("close", "session did not shut down"))
        } else {
            Ok(())
        }
    }
}

struct FakeManager {
    v4: bool,
    profiles: Vec<VnicProfile>,
    networks: Vec<ClusterNetwork>,
    closes: Arc<AtomicUsize>,
    fail_close: bool,
}

impl FakeManager {
    fn v4(profiles: Vec<VnicProfile>, networks: Vec<ClusterNetwork>) -> Self {
        Self {
            v4: true,
            profiles,
            networks,
            closes: Arc::new(AtomicUsize::new(0)),
            fail_close: false,
        }
    }

    fn v3() -> Self {
        Self {
            v4: false,
            profiles: Vec::new(),
            networks: Vec::new(),
            closes: Arc::new(AtomicUsize::new(0)),
            fail_close: false,
        }
    }

    fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

#[async_trait]
impl Manager for FakeManager {
    fn supports_vnic_profiles(&self) -> bool {
        self.v4
    }

    async fn connect(&self, _version: ApiVersion) -> Result<Box<dyn ManagerConnection>> {
        Ok(Box::new(FakeConnection {
            profiles: self.profiles.clone(),
            networks: self.networks.clone(),
            named_networks: Vec::new(),
            closes: Arc::clone(&self.closes),
            fail_close: self.fail_close,
        }))
    }
}

struct NoLegacyNetworks;

#[async_trait]
impl LegacyNetworkSource for NoLegacyNetworks {
    async fn host_networks(&self) -> Result<IndexMap<String, String>> {
        Ok(IndexMap::new())
    }
}

struct StaticLegacyNetworks(IndexMap<String, String>);

#[async_trait]
impl LegacyNetworkSource for StaticLegacyNetworks {
    async fn host_networks(&self) -> Result<IndexMap<String, String>> {
        Ok(self.0.clone())
    }
}

fn profile(id: &str, name: &str, network_id: &str) -> VnicProfile {
    VnicProfile {
        id: id.to_string(),
        name: name.to_string(),
        network_id: network_id.to_string(),
    }
}

fn network(id: &str, name: &str, usages: &[&str]) -> ClusterNetwork {
    ClusterNetwork {
        id: id.to_string(),
        name: name.to_string(),
        usages: usages.iter().map(|u| (*u).to_string()).collect(),
    }
}

#[tokio::test]
async fn test_v4_candidates_join_profiles_with_cluster_networks() {
    let _ = env_logger::builder().is_test(true).try_init();
    let manager = FakeManager::v4(
        vec![
            profile("prof1", "gold", "net1"),
            profile("prof2", "silver", "net2"),
        ],
        vec![
            network("net1", "ovirtmgmt", &["vm", "display"]),
            network("net2", "storage", &["vm"]),
        ],
    );
    let cluster = ClusterHandle::new("cluster1");

    let vlans = list_candidates(&manager, &cluster, &NoLegacyNetworks)
        .await
        .unwrap();

    let entries: Vec<(&str, &str)> = vlans
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("prof1", "gold (ovirtmgmt)"),
            ("prof2", "silver (storage)"),
            (EMPTY_NETWORK, EMPTY_NETWORK),
        ]
    );
}

#[tokio::test]
async fn test_v4_candidates_exclude_foreign_and_non_vm_networks() {
    let manager = FakeManager::v4(
        vec![
            profile("prof1", "gold", "net-elsewhere"),
            profile("prof2", "display-only", "net2"),
        ],
        vec![network("net2", "console", &["display"])],
    );
    let cluster = ClusterHandle::new("cluster1");

    let vlans = list_candidates(&manager, &cluster, &NoLegacyNetworks)
        .await
        .unwrap();

    // Exclusion is silent; only the sentinel remains, and it is selectable.
    assert_eq!(vlans.len(), 1);
    assert_eq!(vlans.get(EMPTY_NETWORK).map(String::as_str), Some(EMPTY_NETWORK));
}

#[tokio::test]
async fn test_empty_candidate_is_always_last() {
    let manager = FakeManager::v4(
        vec![profile("prof1", "gold", "net1")],
        vec![network("net1", "ovirtmgmt", &["vm"])],
    );
    let cluster = ClusterHandle::new("cluster1");

    let vlans = list_candidates(&manager, &cluster, &NoLegacyNetworks)
        .await
        .unwrap();

    assert_eq!(vlans.keys().last().map(String::as_str), Some(EMPTY_NETWORK));
}

#[tokio::test]
async fn test_v3_candidates_delegate_to_legacy_listing() {
    let manager = FakeManager::v3();
    let cluster = ClusterHandle::new("cluster1");
    let mut host_vlans = IndexMap::new();
    host_vlans.insert("ovirtmgmt".to_string(), "ovirtmgmt".to_string());

    let vlans = list_candidates(&manager, &cluster, &StaticLegacyNetworks(host_vlans.clone()))
        .await
        .unwrap();

    assert_eq!(vlans, host_vlans);
    // The legacy listing is served without opening a manager session.
    assert_eq!(manager.closes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_v3_resolves_names_through_cluster_lookup() {
    let conn = FakeConnection {
        named_networks: vec![("ovirtmgmt".to_string(), "net1-id".to_string())],
        ..FakeConnection::default()
    };
    let cluster = ClusterHandle::new("cluster1");
    let strategy = strategy_for(ApiVersion::V3);

    let hit = strategy
        .resolve_network_ref(&conn, &cluster, "ovirtmgmt")
        .await
        .unwrap();
    assert_eq!(hit.as_deref(), Some("net1-id"));

    // Lookup misses resolve to "no network" rather than erroring.
    let miss = strategy
        .resolve_network_ref(&conn, &cluster, "unknown")
        .await
        .unwrap();
    assert_eq!(miss, None);

    let empty = strategy
        .resolve_network_ref(&conn, &cluster, EMPTY_NETWORK)
        .await
        .unwrap();
    assert_eq!(empty, None);
}

#[tokio::test]
async fn test_v4_passes_profile_ids_through() {
    let conn = FakeConnection::default();
    let cluster = ClusterHandle::new("cluster1");
    let strategy = strategy_for(ApiVersion::V4);

    let passed = strategy
        .resolve_network_ref(&conn, &cluster, "prof1")
        .await
        .unwrap();
    assert_eq!(passed.as_deref(), Some("prof1"));

    let empty = strategy
        .resolve_network_ref(&conn, &cluster, EMPTY_NETWORK)
        .await
        .unwrap();
    assert_eq!(empty, None);
}

#[tokio::test]
async fn test_with_connection_closes_on_success() {
    let manager = FakeManager::v4(Vec::new(), Vec::new());
    let closes = Arc::clone(&manager.closes);

    let value = with_connection(&manager, ApiVersion::V4, |_conn| {
        Box::pin(async move { Ok(42) })
    })
    .await
    .unwrap();

    assert_eq!(value, 42);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_with_connection_closes_on_error() {
    let manager = FakeManager::v3();
    let closes = Arc::clone(&manager.closes);

    let result: Result<()> = with_connection(&manager, ApiVersion::V3, |_conn| {
        Box::pin(async move { Err(ProvisionError::remote("update_nic", "boom")) })
    })
    .await;

    assert!(result.is_err());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_close_failure_after_success_is_an_error() {
    let manager = FakeManager::v4(Vec::new(), Vec::new()).failing_close();

    let result: Result<i32> = with_connection(&manager, ApiVersion::V4, |_conn| {
        Box::pin(async move { Ok(42) })
    })
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("close"));
}

#[tokio::test]
async fn test_operation_error_wins_over_close_failure() {
    let manager = FakeManager::v3().failing_close();

    let result: Result<()> = with_connection(&manager, ApiVersion::V3, |_conn| {
        Box::pin(async move { Err(ProvisionError::remote("update_nic", "boom")) })
    })
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("update_nic"));
    assert!(!err.to_string().contains("close"));
}

#[test]
fn test_capability_selects_version_once() {
    assert_eq!(
        ApiVersion::for_manager(&FakeManager::v4(Vec::new(), Vec::new())),
        ApiVersion::V4
    );
    assert_eq!(ApiVersion::for_manager(&FakeManager::v3()), ApiVersion::V3);
}

//! Per-version network reference resolution
//!
//! Version dispatch happens once per reconciliation call: the capability flag
//! selects one of the two strategies, and the shared interface carries the
//! difference between the flat-network (v3) and vnic-profile (v4) models.

use async_trait::async_trait;
use log::debug;

use ovirt_provision_core::{ClusterHandle, Result, EMPTY_NETWORK};

use crate::manager::{ApiVersion, ManagerConnection};

/// Version-specific behavior behind a shared interface
#[async_trait]
pub trait VersionStrategy: Send + Sync {
    /// Resolve an opaque `network_ref` key to what the wire expects
    ///
    /// `Ok(None)` means "explicitly no network" and also covers lookup
    /// misses, which are not an error: the caller proceeds with a null
    /// network reference.
    async fn resolve_network_ref(
        &self,
        conn: &dyn ManagerConnection,
        cluster: &ClusterHandle,
        key: &str,
    ) -> Result<Option<String>>;
}

/// Select the strategy for an API revision, once per call
pub fn strategy_for(version: ApiVersion) -> &'static dyn VersionStrategy {
    match version {
        ApiVersion::V3 => &V3Strategy,
        ApiVersion::V4 => &V4Strategy,
    }
}

/// Legacy flat-network model: refs are network names, resolved per cluster
pub struct V3Strategy;

#[async_trait]
impl VersionStrategy for V3Strategy {
    async fn resolve_network_ref(
        &self,
        conn: &dyn ManagerConnection,
        cluster: &ClusterHandle,
        key: &str,
    ) -> Result<Option<String>> {
        if key == EMPTY_NETWORK {
            return Ok(None);
        }
        let resolved = conn.find_network_id(cluster, key).await?;
        if resolved.is_none() {
            debug!(
                "Network {} not found in cluster {}, resolving to no network",
                key, cluster.id
            );
        }
        Ok(resolved)
    }
}

/// Vnic-profile model: refs are profile ids, passed through as-is
pub struct V4Strategy;

#[async_trait]
impl VersionStrategy for V4Strategy {
    async fn resolve_network_ref(
        &self,
        _conn: &dyn ManagerConnection,
        _cluster: &ClusterHandle,
        key: &str,
    ) -> Result<Option<String>> {
        if key == EMPTY_NETWORK {
            Ok(None)
        } else {
            Ok(Some(key.to_string()))
        }
    }
}

//! Versioned connection facade for the remote manager
//!
//! The wire binding itself lives outside this crate; everything here talks to
//! it through the `ManagerConnection` trait.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use ovirt_provision_core::{ClusterHandle, LiveAdapter, NicSpec, Result, VmHandle};

/// Remote management API revision
///
/// The two revisions carry incompatible object models: v3 attaches adapters
/// to flat networks addressed by name, v4 goes through vnic profiles with
/// their own identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiVersion {
    V3,
    V4,
}

impl ApiVersion {
    /// Pick the revision the manager is capable of, once per call
    pub fn for_manager(manager: &dyn Manager) -> Self {
        if manager.supports_vnic_profiles() {
            ApiVersion::V4
        } else {
            ApiVersion::V3
        }
    }
}

/// A manager that can open versioned sessions
#[async_trait]
pub trait Manager: Send + Sync {
    /// Whether the manager supports the vnic-profile network model (v4)
    fn supports_vnic_profiles(&self) -> bool;

    /// Open a session scoped to one API version
    async fn connect(&self, version: ApiVersion) -> Result<Box<dyn ManagerConnection>>;
}

/// A vnic profile as listed by a v4 manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VnicProfile {
    pub id: String,
    pub name: String,
    pub network_id: String,
}

/// A network as listed for a cluster by a v4 manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNetwork {
    pub id: String,
    pub name: String,
    /// Usage flags as the remote API reports them ("vm", "display", ...)
    #[serde(default)]
    pub usages: Vec<String>,
}

/// One open session against the remote manager
///
/// The session is scoped to a single API version; callers only invoke the
/// operations that exist in that revision. Remote failures come back as
/// `ProvisionError` values and are never retried or reinterpreted here.
#[async_trait]
pub trait ManagerConnection: Send + Sync {
    /// List the VM's adapters as the manager currently sees them
    async fn list_nics(&self, vm: &VmHandle) -> Result<Vec<LiveAdapter>>;

    /// Create a new adapter on the VM
    async fn create_nic(&self, vm: &VmHandle, spec: &NicSpec) -> Result<()>;

    /// Update an existing adapter
    async fn update_nic(&self, vm: &VmHandle, nic_id: &str, spec: &NicSpec) -> Result<()>;

    /// Remove an adapter from the VM
    async fn remove_nic(&self, vm: &VmHandle, nic_id: &str) -> Result<()>;

    /// List all vnic profiles visible to the manager (v4)
    async fn list_vnic_profiles(&self) -> Result<Vec<VnicProfile>>;

    /// List the networks belonging to a cluster (v4)
    async fn list_cluster_networks(&self, cluster: &ClusterHandle) -> Result<Vec<ClusterNetwork>>;

    /// Resolve a legacy network name to its id within a cluster (v3)
    ///
    /// A miss is `Ok(None)`, not an error.
    async fn find_network_id(&self, cluster: &ClusterHandle, name: &str)
        -> Result<Option<String>>;

    /// Tear the session down
    async fn close(&self) -> Result<()>;
}

/// Run an operation inside a scoped manager session
///
/// The session is closed on every exit path. A close failure after a
/// successful operation is reported; a close failure after a failed
/// operation is logged and the operation error wins.
pub async fn with_connection<'a, T, F>(
    manager: &dyn Manager,
    version: ApiVersion,
    op: F,
) -> Result<T>
where
    T: Send,
    F: FnOnce(Arc<dyn ManagerConnection>) -> BoxFuture<'a, Result<T>> + Send + 'a,
{
    debug!("Opening manager connection ({:?})", version);
    let conn: Arc<dyn ManagerConnection> = Arc::from(manager.connect(version).await?);

    let result = op(Arc::clone(&conn)).await;
    let closed = conn.close().await;

    match result {
        Ok(value) => {
            closed?;
            Ok(value)
        }
        Err(err) => {
            if let Err(close_err) = closed {
                warn!("Failed to close manager connection: {}", close_err);
            }
            Err(err)
        }
    }
}

//! Network candidate resolution for the provisioning dialog

use async_trait::async_trait;
use indexmap::IndexMap;
use log::{debug, info};

use ovirt_provision_core::{ClusterHandle, Result, EMPTY_NETWORK};

use crate::manager::{with_connection, ApiVersion, Manager, ManagerConnection};

/// Per-host network listing used by v3 managers
///
/// External collaborator; the v3 candidate path delegates to it unchanged.
#[async_trait]
pub trait LegacyNetworkSource: Send + Sync {
    async fn host_networks(&self) -> Result<IndexMap<String, String>>;
}

/// List the selectable network candidates for a cluster
///
/// Returns the candidate keys mapped to display labels, in remote listing
/// order. On v4 managers this opens one session and joins the vnic profiles
/// with the cluster networks flagged for VM usage, followed by the `<Empty>`
/// sentinel. On v3 managers the per-host listing is used as-is and no
/// session is opened.
pub async fn list_candidates(
    manager: &dyn Manager,
    cluster: &ClusterHandle,
    legacy: &dyn LegacyNetworkSource,
) -> Result<IndexMap<String, String>> {
    let version = ApiVersion::for_manager(manager);

    let vlans = match version {
        ApiVersion::V3 => legacy.host_networks().await?,
        ApiVersion::V4 => {
            with_connection(manager, version, move |conn| {
                Box::pin(async move { vnic_profile_candidates(conn.as_ref(), cluster).await })
            })
            .await?
        }
    };

    info!(
        "Resolved {} network candidate(s) for cluster {} ({:?})",
        vlans.len(),
        cluster.id,
        version
    );
    Ok(vlans)
}

/// Join the vnic profiles with the cluster's VM-usable networks
async fn vnic_profile_candidates(
    conn: &dyn ManagerConnection,
    cluster: &ClusterHandle,
) -> Result<IndexMap<String, String>> {
    let profiles = conn.list_vnic_profiles().await?;
    let cluster_networks = conn.list_cluster_networks(cluster).await?;

    let mut vlans = IndexMap::new();
    for profile in &profiles {
        let profile_network = cluster_networks
            .iter()
            .find(|network| network.id == profile.network_id);
        match profile_network {
            Some(network) if network.usages.iter().any(|usage| usage == "vm") => {
                vlans.insert(
                    profile.id.clone(),
                    format!("{} ({})", profile.name, network.name),
                );
            }
            _ => {
                // Profiles whose network is outside the cluster or not
                // usable by VMs are simply not offered.
                debug!(
                    "Skipping vnic profile {} for cluster {}",
                    profile.id, cluster.id
                );
            }
        }
    }

    // "<Empty>" must stay selectable even with zero real candidates,
    // and always comes last.
    vlans.insert(EMPTY_NETWORK.to_string(), EMPTY_NETWORK.to_string());
    Ok(vlans)
}

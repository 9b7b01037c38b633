//! NIC reconciliation against live manager state

use log::{debug, info};

use ovirt_provision_api::{ManagerConnection, VersionStrategy};
use ovirt_provision_core::{
    ClusterHandle, DesiredAdapter, NetworkBinding, NicSpec, Result, VmHandle,
};

/// Brings a VM's live adapters in line with the desired-adapter list
///
/// One reconciliation call fetches the live adapters exactly once, at entry,
/// and treats that snapshot as immutable while the create/update/delete
/// calls are issued. Remote state does change as calls land, which is why
/// the snapshot is never cached across calls. There is no rollback: if the
/// nth call fails, the earlier ones stay applied and the error propagates.
pub struct NicReconciler<'a> {
    strategy: &'a dyn VersionStrategy,
    vm: &'a VmHandle,
    cluster: &'a ClusterHandle,
}

impl<'a> NicReconciler<'a> {
    pub fn new(
        strategy: &'a dyn VersionStrategy,
        vm: &'a VmHandle,
        cluster: &'a ClusterHandle,
    ) -> Self {
        Self {
            strategy,
            vm,
            cluster,
        }
    }

    /// Apply the desired-adapter list to the VM
    pub async fn reconcile(
        &self,
        conn: &dyn ManagerConnection,
        desired: &[DesiredAdapter],
    ) -> Result<()> {
        let live = conn.list_nics(self.vm).await?;
        debug!(
            "Reconciling VM {}: {} desired, {} live adapter(s)",
            self.vm.id,
            desired.len(),
            live.len()
        );

        let slot_count = desired.len().max(live.len());
        for i in 0..slot_count {
            match (desired.get(i), live.get(i)) {
                (Some(want), Some(have)) => {
                    // An all-empty desired slot still issues the update with
                    // only the unchanged name, keeping the adapter touched
                    // for the later workflow steps.
                    let spec = self.build_spec(conn, have.name.clone(), want).await?;
                    info!("Updating NIC {} ({}) on VM {}", have.name, have.id, self.vm.id);
                    conn.update_nic(self.vm, &have.id, &spec).await?;
                }
                (Some(want), None) => {
                    let spec = self
                        .build_spec(conn, format!("nic{}", i + 1), want)
                        .await?;
                    info!("Creating NIC {} on VM {}", spec.name, self.vm.id);
                    conn.create_nic(self.vm, &spec).await?;
                }
                (None, Some(have)) => {
                    info!("Removing NIC {} ({}) from VM {}", have.name, have.id, self.vm.id);
                    conn.remove_nic(self.vm, &have.id).await?;
                }
                (None, None) => unreachable!("slot_count bounds the loop"),
            }
        }

        Ok(())
    }

    async fn build_spec(
        &self,
        conn: &dyn ManagerConnection,
        name: String,
        want: &DesiredAdapter,
    ) -> Result<NicSpec> {
        let network = match &want.network_ref {
            Some(key) => {
                match self
                    .strategy
                    .resolve_network_ref(conn, self.cluster, key)
                    .await?
                {
                    Some(reference) => NetworkBinding::Attach(reference),
                    None => NetworkBinding::Detach,
                }
            }
            None => NetworkBinding::Keep,
        };

        Ok(NicSpec {
            name,
            network,
            mac_address: want.mac_address.clone(),
        })
    }
}

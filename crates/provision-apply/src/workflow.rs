//! Provisioning workflow surface exposed to the surrounding task machinery
//!
//! The multi-step provisioning workflow (disk cloning, power-on,
//! customization) lives elsewhere; this is the slice of it that owns network
//! adapters and the dialog values feeding them.

use std::sync::Arc;

use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};

use ovirt_provision_api::{
    list_candidates, strategy_for, with_connection, ApiVersion, LegacyNetworkSource, Manager,
    VersionStrategy,
};
use ovirt_provision_core::{
    build_desired_adapters, mac_for_requested_network, ClusterHandle, DesiredAdapter,
    NetworkCandidate, Result, VmHandle,
};

use crate::reconciler::NicReconciler;

/// Provision types offered by the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionType {
    Pxe,
    Iso,
    NativeClone,
}

/// Fixed provision-type choices, key to display label
pub fn allowed_provision_types() -> IndexMap<ProvisionType, &'static str> {
    IndexMap::from([
        (ProvisionType::Pxe, "PXE"),
        (ProvisionType::Iso, "ISO"),
        (ProvisionType::NativeClone, "Native Clone"),
    ])
}

/// Durable option record of the provisioning request
///
/// Persisted by the external provisioning task between workflow steps; the
/// only field this crate writes back is `networks`. `vlan` holds the
/// candidate the operator picked in the dialog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionOptions {
    #[serde(default)]
    pub provision_type: Option<ProvisionType>,
    #[serde(default)]
    pub linked_clone: bool,
    #[serde(default)]
    pub vlan: Option<NetworkCandidate>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub networks: Vec<Option<DesiredAdapter>>,
}

/// One provisioning request's view of its destination VM
pub struct ProvisionRequest {
    manager: Arc<dyn Manager>,
    vm: VmHandle,
    cluster: ClusterHandle,
    pub options: ProvisionOptions,
}

impl ProvisionRequest {
    pub fn new(
        manager: Arc<dyn Manager>,
        vm: VmHandle,
        cluster: ClusterHandle,
        options: ProvisionOptions,
    ) -> Self {
        Self {
            manager,
            vm,
            cluster,
            options,
        }
    }

    pub fn vm(&self) -> &VmHandle {
        &self.vm
    }

    pub fn cluster(&self) -> &ClusterHandle {
        &self.cluster
    }

    pub fn supports_pxe(&self) -> bool {
        self.options.provision_type == Some(ProvisionType::Pxe)
    }

    pub fn supports_iso(&self) -> bool {
        self.options.provision_type == Some(ProvisionType::Iso)
    }

    pub fn supports_native_clone(&self) -> bool {
        self.options.provision_type == Some(ProvisionType::NativeClone)
    }

    pub fn supports_linked_clone(&self) -> bool {
        self.supports_native_clone() && self.options.linked_clone
    }

    pub fn supports_cloud_init(&self) -> bool {
        true
    }

    /// The selectable network values for this request's cluster
    pub async fn allowed_vlans(
        &self,
        legacy: &dyn LegacyNetworkSource,
    ) -> Result<IndexMap<String, String>> {
        list_candidates(self.manager.as_ref(), &self.cluster, legacy).await
    }

    /// Bring the destination VM's adapters in line with the request
    ///
    /// Merges the dialog values and the automation overrides into one
    /// desired list, writes the normalized list back into
    /// `options.networks` so later workflow steps observe it, and runs one
    /// reconciliation inside one scoped connection. With nothing desired at
    /// all, no connection is opened.
    pub async fn configure_network_adapters(&mut self) -> Result<()> {
        let dialog_networks: Vec<Option<String>> = self
            .options
            .vlan
            .iter()
            .map(|vlan| Some(vlan.key.clone()))
            .collect();
        let desired = build_desired_adapters(
            &dialog_networks,
            self.options.mac_address.as_deref(),
            &self.options.networks,
        );

        self.options.networks = desired.iter().cloned().map(Some).collect();

        if desired.is_empty() {
            info!("No network adapters requested for VM {}", self.vm.id);
            return Ok(());
        }

        let version = ApiVersion::for_manager(self.manager.as_ref());
        let strategy = strategy_for(version);
        let reconciler = NicReconciler::new(strategy, &self.vm, &self.cluster);

        with_connection(self.manager.as_ref(), version, move |conn| {
            Box::pin(async move { reconciler.reconcile(conn.as_ref(), &desired).await })
        })
        .await
    }

    /// MAC address of the adapter currently serving the dialog's network
    ///
    /// Used by the clone/customization step to carry an address over.
    pub async fn get_mac_address_of_nic_on_requested_vlan(&self) -> Result<Option<String>> {
        let vlan = match &self.options.vlan {
            Some(vlan) => vlan.clone(),
            None => return Ok(None),
        };

        let version = ApiVersion::for_manager(self.manager.as_ref());
        let strategy = strategy_for(version);
        let vm = &self.vm;
        let cluster = &self.cluster;

        with_connection(self.manager.as_ref(), version, move |conn| {
            Box::pin(async move {
                let requested = strategy
                    .resolve_network_ref(conn.as_ref(), cluster, &vlan.key)
                    .await?;
                let requested = match requested {
                    Some(requested) => requested,
                    None => return Ok(None),
                };

                let live = conn.list_nics(vm).await?;
                Ok(mac_for_requested_network(&live, &requested).map(str::to_string))
            })
        })
        .await
    }
}

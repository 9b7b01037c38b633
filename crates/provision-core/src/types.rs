//! Core data types for NIC provisioning

use serde::{Deserialize, Serialize};

/// Sentinel network key meaning "explicitly attach to no network"
pub const EMPTY_NETWORK: &str = "<Empty>";

/// One slot of the desired-adapter list
///
/// `network_ref` is opaque here: a legacy network name on v3 managers, a
/// vnic-profile id on v4 managers, or the `<Empty>` sentinel. The reconciler
/// only equality-compares it and hands it to the version strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredAdapter {
    #[serde(default, rename = "network")]
    pub network_ref: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
}

impl DesiredAdapter {
    /// Overlay the fields another source sets onto this slot
    ///
    /// Only fields present in `other` are taken; everything else stays.
    pub fn overlay(&mut self, other: &DesiredAdapter) {
        if other.network_ref.is_some() {
            self.network_ref = other.network_ref.clone();
        }
        if other.mac_address.is_some() {
            self.mac_address = other.mac_address.clone();
        }
    }
}

/// Snapshot of one adapter as the remote manager reports it
///
/// Fetched fresh at the start of every reconciliation call, never cached.
/// `network_id` carries the session version's network reference for the NIC:
/// the network id on v3, the vnic-profile id on v4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveAdapter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
}

/// A selectable network value offered to the operator or automation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCandidate {
    /// Value stored back as a `network_ref`
    pub key: String,
    /// Human-readable display string
    pub label: String,
}

/// Target network state carried by a create/update payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkBinding {
    /// No opinion, leave the adapter's network untouched
    Keep,
    /// Explicitly attach to no network
    Detach,
    /// Attach to the resolved network id (v3) or vnic-profile id (v4)
    Attach(String),
}

/// Payload for a NIC create or update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NicSpec {
    pub name: String,
    pub network: NetworkBinding,
    pub mac_address: Option<String>,
}

/// Handle of the VM whose adapters are being reconciled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmHandle {
    pub id: String,
}

impl VmHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Handle of the destination cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterHandle {
    pub id: String,
}

impl ClusterHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

//! oVirt Provisioning Core
//!
//! Data model and desired-state handling for NIC provisioning

pub mod error;
pub mod mac;
pub mod options;
pub mod types;

pub use error::ProvisionError;
pub use mac::mac_for_requested_network;
pub use options::build_desired_adapters;
pub use types::{
    ClusterHandle, DesiredAdapter, LiveAdapter, NetworkBinding, NetworkCandidate, NicSpec,
    VmHandle, EMPTY_NETWORK,
};

/// Result type for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

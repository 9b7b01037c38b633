//! oVirt Provisioning Apply
//!
//! NIC reconciliation and the provisioning workflow surface

pub mod reconciler;
pub mod workflow;


pub use reconciler::NicReconciler;
pub use workflow::{allowed_provision_types, ProvisionOptions, ProvisionRequest, ProvisionType};

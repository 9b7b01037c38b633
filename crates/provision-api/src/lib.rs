//! oVirt Provisioning API
//!
//! Versioned manager connection facade, per-version network strategies and
//! the network candidate resolver

pub mod candidates;
pub mod manager;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use candidates::{list_candidates, LegacyNetworkSource};
pub use manager::{
    with_connection, ApiVersion, ClusterNetwork, Manager, ManagerConnection, VnicProfile,
};
pub use strategy::{strategy_for, V3Strategy, V4Strategy, VersionStrategy};

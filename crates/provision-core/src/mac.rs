//! MAC address lookup over an already fetched adapter snapshot

use crate::types::LiveAdapter;

/// Find the MAC address currently serving the requested network
///
/// Scans the snapshot in listing order and returns the MAC of the first
/// adapter whose network reference equals `requested`. Pure lookup, the
/// caller is responsible for having fetched the adapters.
pub fn mac_for_requested_network<'a>(
    live: &'a [LiveAdapter],
    requested: &str,
) -> Option<&'a str> {
    live.iter()
        .find(|nic| nic.network_id.as_deref() == Some(requested))
        .and_then(|nic| nic.mac_address.as_deref())
}

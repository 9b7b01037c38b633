//! Desired-state extraction from dialog and override sources

use log::debug;

use crate::types::DesiredAdapter;

/// Merge the two desired-adapter sources into one positional list
///
/// The dialog supplies a positional list of optional network keys plus a
/// single MAC value that belongs to slot 0. The override list comes from
/// automation and is overlaid field-by-field on top: only fields an override
/// entry carries are taken, a `None` entry leaves the slot untouched, and
/// entries beyond the dialog list create new slots. The returned order is the
/// adapter slot order used everywhere downstream.
pub fn build_desired_adapters(
    dialog_networks: &[Option<String>],
    dialog_mac: Option<&str>,
    overrides: &[Option<DesiredAdapter>],
) -> Vec<DesiredAdapter> {
    let slot_count = dialog_networks.len().max(overrides.len());
    let mut slots: Vec<DesiredAdapter> = Vec::with_capacity(slot_count);

    for i in 0..slot_count {
        let mut slot = DesiredAdapter::default();
        if let Some(Some(key)) = dialog_networks.get(i) {
            slot.network_ref = Some(key.clone());
        }
        slots.push(slot);
    }

    // The dialog carries at most one MAC and it belongs to the first adapter.
    if !dialog_networks.is_empty() {
        if let Some(first) = slots.first_mut() {
            if first.mac_address.is_none() {
                first.mac_address = dialog_mac.map(str::to_string);
            }
        }
    }

    for (i, entry) in overrides.iter().enumerate() {
        if let Some(entry) = entry {
            slots[i].overlay(entry);
        }
    }

    debug!("Built {} desired adapter slot(s)", slots.len());
    slots
}

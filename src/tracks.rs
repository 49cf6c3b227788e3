//! Per-device movement tracks.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{DeviceSighting, DeviceTrack, HardwareAddress};

/// Group sightings by identity into time-ordered tracks.
///
/// Each track is sorted ascending by `observed_at`, missing timestamps
/// first. Single-sighting devices still get a track of length 1.
pub fn build_tracks(sightings: &[DeviceSighting]) -> BTreeMap<HardwareAddress, DeviceTrack> {
    let mut grouped: BTreeMap<HardwareAddress, Vec<DeviceSighting>> = BTreeMap::new();
    for sighting in sightings {
        grouped
            .entry(sighting.identity.clone())
            .or_default()
            .push(sighting.clone());
    }

    let tracks: BTreeMap<_, _> = grouped
        .into_iter()
        .map(|(identity, group)| (identity.clone(), DeviceTrack::new(identity, group)))
        .collect();

    debug!(
        "Built {} tracks from {} sightings",
        tracks.len(),
        sightings.len()
    );
    tracks
}

//! Position inference for alerts without a valid fix.

use tracing::{debug, info, warn};

use crate::{
    models::{time_key, AlertEvent, DeviceSighting, LocationSource},
    normalize::validate_coordinates,
};

/// Places alerts relative to known device fixes.
pub struct AlertLocator<'a> {
    /// Sightings with a timestamp, ascending
    timed: Vec<&'a DeviceSighting>,
    /// Earliest sighting overall, missing timestamps counting as the epoch
    earliest: Option<&'a DeviceSighting>,
    offset_degrees: f64,
}

impl<'a> AlertLocator<'a> {
    pub fn new(sightings: &'a [DeviceSighting], offset_degrees: f64) -> Self {
        let mut timed: Vec<&DeviceSighting> =
            sightings.iter().filter(|s| s.observed_at.is_some()).collect();
        timed.sort_by_key(|s| s.time_key());
        let earliest = sightings.iter().min_by_key(|s| s.time_key());

        Self {
            timed,
            earliest,
            offset_degrees,
        }
    }

    /// Latest sighting at or before the alert's timestamp.
    fn preceding(&self, alert: &AlertEvent) -> Option<&'a DeviceSighting> {
        alert.occurred_at?;
        let key = time_key(alert.occurred_at);
        let idx = self.timed.partition_point(|s| s.time_key() <= key);
        idx.checked_sub(1).map(|i| self.timed[i])
    }

    fn offset_from(&self, sighting: &DeviceSighting) -> (f64, f64) {
        (
            (sighting.latitude + self.offset_degrees).clamp(-90.0, 90.0),
            (sighting.longitude + self.offset_degrees).clamp(-180.0, 180.0),
        )
    }

    /// Give one alert a renderable location.
    ///
    /// A valid fix passes through. Otherwise the alert is offset from the
    /// latest preceding sighting, then from the earliest sighting, and
    /// finally placed at `fallback_center`.
    pub fn locate(&self, alert: &AlertEvent, fallback_center: (f64, f64)) -> AlertEvent {
        let mut located = alert.clone();

        if validate_coordinates(alert.latitude, alert.longitude).is_ok() {
            if located.location_source == LocationSource::Unresolved {
                located.location_source = LocationSource::Measured;
            }
            return located;
        }

        let ((lat, lon), source) = if let Some(fix) = self.preceding(alert) {
            (
                self.offset_from(fix),
                LocationSource::PrecedingSighting {
                    identity: fix.identity.clone(),
                },
            )
        } else if let Some(fix) = self.earliest {
            (
                self.offset_from(fix),
                LocationSource::EarliestSighting {
                    identity: fix.identity.clone(),
                },
            )
        } else {
            warn!(
                "No sightings to place alert {} from {}; using map center",
                alert.alert_type, alert.identity
            );
            (fallback_center, LocationSource::MapCenter)
        };

        debug!(
            "Alert {} from {} placed at ({}, {}) via {:?}",
            alert.alert_type, alert.identity, lat, lon, source
        );
        located.latitude = Some(lat);
        located.longitude = Some(lon);
        located.location_source = source;
        located
    }

    /// Resolve every alert; the result has the same length and order.
    ///
    /// A (0, 0) `fallback_center` is applied as-is and tagged
    /// [`LocationSource::MapCenter`].
    pub fn resolve(&self, alerts: &[AlertEvent], fallback_center: (f64, f64)) -> Vec<AlertEvent> {
        let resolved: Vec<AlertEvent> = alerts
            .iter()
            .map(|alert| self.locate(alert, fallback_center))
            .collect();

        let inferred = resolved
            .iter()
            .filter(|a| a.location_source.is_synthetic())
            .count();
        info!(
            "Resolved {} alerts ({} with inferred locations)",
            resolved.len(),
            inferred
        );
        resolved
    }
}

/// Choose the map center.
///
/// A configured center wins, then the first sighting, then the first alert
/// with a valid fix, then (0, 0). The last fallback coincides with the
/// "no fix" pair, so alerts placed there are only told apart by
/// [`LocationSource::MapCenter`].
pub fn map_center(
    sightings: &[DeviceSighting],
    alerts: &[AlertEvent],
    configured: Option<[f64; 2]>,
) -> (f64, f64) {
    if let Some([lat, lon]) = configured {
        return (lat, lon);
    }
    if let Some(first) = sightings.first() {
        return (first.latitude, first.longitude);
    }
    alerts
        .iter()
        .find_map(|a| validate_coordinates(a.latitude, a.longitude).ok())
        .unwrap_or_else(|| {
            warn!("No valid coordinates to center the map, using (0, 0)");
            (0.0, 0.0)
        })
}

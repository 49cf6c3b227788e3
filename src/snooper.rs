//! Movement-based snooper detection.
//!
//! Each later sighting of a device is compared with the earliest sighting
//! still inside the time window. The first pair whose straight-line
//! distance exceeds the threshold classifies the device and ends
//! evaluation for it. Distance is not accumulated across the walk.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::{
    config::DetectionConfig,
    geodesy::distance_miles,
    models::{DeviceTrack, HardwareAddress, SnooperFinding},
};

/// Gap between two time keys; `None` when it does not fit in an `i64`.
fn gap_micros(later: i64, earlier: i64) -> Option<i64> {
    later.checked_sub(earlier)
}

/// First threshold breach in a track: (distance miles, elapsed seconds).
fn first_breach(track: &DeviceTrack, threshold_miles: f64, window_micros: i64) -> Option<(f64, i64)> {
    let sightings = track.sightings();
    let mut anchor = 0;

    for later in 1..sightings.len() {
        let later_key = sightings[later].time_key();
        while anchor < later
            && gap_micros(later_key, sightings[anchor].time_key())
                .map_or(true, |gap| gap > window_micros)
        {
            anchor += 1;
        }
        if anchor == later {
            continue;
        }

        let (from, to) = (&sightings[anchor], &sightings[later]);
        let distance = distance_miles(from.longitude, from.latitude, to.longitude, to.latitude);
        let Some(elapsed_micros) = gap_micros(later_key, from.time_key()) else {
            continue;
        };
        let elapsed_secs = elapsed_micros / 1_000_000;
        debug!(
            "Device {}: moved {:.2} miles in {} seconds",
            track.identity(),
            distance,
            elapsed_secs
        );

        if distance > threshold_miles {
            return Some((distance, elapsed_secs));
        }
    }
    None
}

/// Classify tracks whose movement exceeds the configured threshold.
///
/// Tracks with fewer than two sightings are never candidates, and each
/// identity appears at most once in the result.
pub fn detect(
    tracks: &BTreeMap<HardwareAddress, DeviceTrack>,
    config: &DetectionConfig,
) -> Vec<SnooperFinding> {
    let threshold = config.distance_threshold_miles;
    let window_micros = i64::try_from(config.time_window.as_micros()).unwrap_or(i64::MAX);

    let findings: Vec<SnooperFinding> = tracks
        .values()
        .filter(|track| track.len() >= 2)
        .filter_map(|track| {
            let (distance, elapsed) = first_breach(track, threshold, window_micros)?;
            info!(
                "Snooper detected: {}, moved {:.2} miles in {} seconds",
                track.identity(),
                distance,
                elapsed
            );
            Some(SnooperFinding {
                identity: track.identity().clone(),
                track: track.clone(),
                trigger_distance_miles: distance,
                trigger_elapsed_secs: elapsed,
            })
        })
        .collect();

    info!(
        "Total snoopers detected: {} (threshold {} miles, window {} seconds)",
        findings.len(),
        threshold,
        config.time_window.as_secs()
    );
    findings
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::geodesy::EARTH_RADIUS_MILES;
    use crate::tracks::{build_tracks, tests::sighting};

    // Degrees of latitude spanning `miles` on the model sphere.
    fn lat_offset(miles: f64) -> f64 {
        (miles / EARTH_RADIUS_MILES).to_degrees()
    }

    fn config(threshold: f64, window_secs: u64) -> DetectionConfig {
        DetectionConfig::new(threshold, Duration::from_secs(window_secs)).unwrap()
    }

    #[test]
    fn one_mile_in_ten_minutes_is_snooper() {
        let sightings = vec![
            sighting("aa:00:00:00:00:01", 40.0, -73.0, Some(1_000)),
            sighting("aa:00:00:00:00:01", 40.0 + lat_offset(1.0), -73.0, Some(1_600)),
        ];
        let findings = detect(&build_tracks(&sightings), &config(0.5, 3600));

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.identity.as_str(), "aa:00:00:00:00:01");
        assert!((finding.trigger_distance_miles - 1.0).abs() < 1e-6);
        assert_eq!(finding.trigger_elapsed_secs, 600);
        assert_eq!(finding.latest_sighting().unwrap().observed_at.unwrap().timestamp(), 1_600);
    }

    #[test]
    fn jitter_below_threshold_is_not_snooper() {
        let sightings = vec![
            sighting("aa:00:00:00:00:01", 40.0, -73.0, Some(1_000)),
            sighting("aa:00:00:00:00:01", 40.0 + lat_offset(0.01), -73.0, Some(1_600)),
        ];
        assert!(detect(&build_tracks(&sightings), &config(0.5, 3600)).is_empty());
    }

    #[test]
    fn single_sighting_never_snooper() {
        let sightings = vec![sighting("aa:00:00:00:00:01", 40.0, -73.0, Some(1_000))];
        assert!(detect(&build_tracks(&sightings), &config(0.0, 3600)).is_empty());
    }

    #[test]
    fn movement_outside_window_is_ignored() {
        let sightings = vec![
            sighting("aa:00:00:00:00:01", 40.0, -73.0, Some(0)),
            sighting("aa:00:00:00:00:01", 41.0, -73.0, Some(10_000)),
        ];
        assert!(detect(&build_tracks(&sightings), &config(0.5, 3600)).is_empty());
    }

    #[test]
    fn window_slides_forward() {
        // The first fix is stale by the time the device moves; the
        // comparison uses the earliest fix still in the window.
        let far = 40.0 + lat_offset(2.0);
        let sightings = vec![
            sighting("aa:00:00:00:00:01", far, -73.0, Some(0)),
            sighting("aa:00:00:00:00:01", 40.0, -73.0, Some(5_000)),
            sighting("aa:00:00:00:00:01", 40.0 + lat_offset(1.0), -73.0, Some(5_300)),
        ];
        let findings = detect(&build_tracks(&sightings), &config(0.5, 3600));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].trigger_elapsed_secs, 300);
        assert!((findings[0].trigger_distance_miles - 1.0).abs() < 1e-6);
    }

    #[test]
    fn first_breach_wins() {
        let sightings = vec![
            sighting("aa:00:00:00:00:01", 40.0, -73.0, Some(0)),
            sighting("aa:00:00:00:00:01", 40.0 + lat_offset(1.0), -73.0, Some(60)),
            sighting("aa:00:00:00:00:01", 40.0 + lat_offset(5.0), -73.0, Some(120)),
        ];
        let findings = detect(&build_tracks(&sightings), &config(0.5, 3600));
        assert_eq!(findings.len(), 1);
        assert!((findings[0].trigger_distance_miles - 1.0).abs() < 1e-6);
    }

    #[test]
    fn missing_timestamps_do_not_crash() {
        let sightings = vec![
            sighting("aa:00:00:00:00:01", 40.0, -73.0, None),
            sighting("aa:00:00:00:00:01", 40.0 + lat_offset(1.0), -73.0, None),
            sighting("aa:00:00:00:00:02", 40.0, -73.0, None),
            sighting("aa:00:00:00:00:02", 40.0, -73.0, Some(30)),
        ];
        let findings = detect(&build_tracks(&sightings), &config(0.5, 3600));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].identity.as_str(), "aa:00:00:00:00:01");
    }

    #[test]
    fn extreme_timestamps_fall_outside_window() {
        let sightings = vec![
            sighting("aa:00:00:00:00:01", 40.0, -73.0, Some(-8_000_000_000_000)),
            sighting("aa:00:00:00:00:01", 41.0, -73.0, Some(8_000_000_000_000)),
        ];
        let tracks = build_tracks(&sightings);
        assert_eq!(tracks.values().next().unwrap().len(), 2);
        assert!(detect(&tracks, &DetectionConfig::default()).is_empty());
        assert!(detect(&tracks, &config(0.5, u64::MAX)).is_empty());
    }

    #[test]
    fn empty_tracks() {
        assert!(detect(&BTreeMap::new(), &DetectionConfig::default()).is_empty());
    }
}

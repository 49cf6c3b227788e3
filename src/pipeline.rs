//! One full analysis run over a loaded capture.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::{DetectionConfig, LocatorConfig},
    database::models::{AlertRow, DeviceRow},
    errors::SnooprError,
    locator::{map_center, AlertLocator},
    models::{AlertEvent, DeviceSighting, SnooperFinding},
    normalize::{normalize_alerts, normalize_devices},
    snooper::detect,
    tracks::build_tracks,
};

/// Canonical, fully positioned output of a run
#[derive(Debug, Serialize)]
pub struct Analysis {
    /// Map center as (lat, lon)
    pub center: (f64, f64),
    pub devices: Vec<DeviceSighting>,
    pub snoopers: Vec<SnooperFinding>,
    pub alerts: Vec<AlertEvent>,
    /// Device records rejected during normalization. Rows the capture
    /// driver could not decode are logged by the database layer and not
    /// counted here.
    pub rejected_devices: usize,
    /// Alert records rejected during normalization, counted the same way.
    pub rejected_alerts: usize,
}

/// Normalize, detect snoopers and place alerts.
///
/// Bad records are skipped. Fails only with [`SnooprError::NoUsableInput`]
/// when neither a sighting nor an alert survives normalization.
pub fn analyze(
    device_rows: &[DeviceRow],
    alert_rows: &[AlertRow],
    detection: &DetectionConfig,
    locator: &LocatorConfig,
) -> Result<Analysis, SnooprError> {
    let devices = normalize_devices(device_rows);
    let alerts = normalize_alerts(alert_rows);

    if devices.records.is_empty() && alerts.records.is_empty() {
        warn!("No devices or alerts to analyze");
        return Err(SnooprError::NoUsableInput);
    }

    let tracks = build_tracks(&devices.records);
    let snoopers = detect(&tracks, detection);

    let center = map_center(&devices.records, &alerts.records, locator.map_center);
    let resolved = AlertLocator::new(&devices.records, locator.offset_degrees)
        .resolve(&alerts.records, center);

    info!(
        "Analysis complete: {} devices, {} snoopers, {} alerts",
        devices.records.len(),
        snoopers.len(),
        resolved.len()
    );

    Ok(Analysis {
        center,
        rejected_devices: devices.rejected.len(),
        rejected_alerts: alerts.rejected.len(),
        devices: devices.records,
        snoopers,
        alerts: resolved,
    })
}

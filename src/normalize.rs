//! Raw capture rows to canonical sightings and alerts.
//!
//! Every per-record problem is recovered here: the record is skipped, the
//! reason is kept in [`Normalized::rejected`], and the batch continues.

pub mod blob;
pub mod classify;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    database::models::{AlertRow, DeviceRow},
    errors::SnooprError,
    models::{AlertEvent, DeviceFamily, DeviceSighting, HardwareAddress, LocationSource},
    sanitize::{sanitize_string, UNKNOWN},
};
use blob::*;
use classify::{classify, is_drone_candidate};

const UNKNOWN_ALERT: &str = "Unknown alert";
const NO_DESCRIPTION: &str = "No description";

/// A record that was skipped during normalization.
#[derive(Debug)]
pub struct Rejection {
    pub identity: HardwareAddress,
    pub reason: SnooprError,
}

/// Accepted records plus the rejections of one batch.
#[derive(Debug)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub rejected: Vec<Rejection>,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// Check a coordinate pair.
///
/// Valid iff both are present and finite, latitude is in [-90, 90],
/// longitude is in [-180, 180], and the pair is not exactly (0, 0), which
/// the capture uses for "no fix".
pub fn validate_coordinates(lat: Option<f64>, lon: Option<f64>) -> Result<(f64, f64), SnooprError> {
    let invalid = || SnooprError::InvalidCoordinates { lat, lon };
    let (Some(la), Some(lo)) = (lat, lon) else {
        return Err(invalid());
    };

    if !la.is_finite() || !lo.is_finite() {
        return Err(invalid());
    }
    if !(-90.0..=90.0).contains(&la) || !(-180.0..=180.0).contains(&lo) {
        return Err(invalid());
    }
    if la == 0.0 && lo == 0.0 {
        return Err(invalid());
    }
    Ok((la, lo))
}

/// Normalize one `devices` row.
pub fn normalize_device(row: &DeviceRow) -> Result<DeviceSighting, SnooprError> {
    let (latitude, longitude) = validate_coordinates(row.min_lat, row.min_lon)?;
    let observed_at = row.last_time.map(timestamp_from_secs).transpose()?;
    let attrs = decode_blob(row.device.as_ref().ok_or(SnooprError::MissingBlob)?)?;

    let identity = row_identity(row.devmac.as_deref(), &attrs, MAC_PATHS);
    let device_type = classify(string_at(&attrs, TYPE_PATHS).as_deref().unwrap_or(""));
    let display_name = sanitize_string(string_at(&attrs, NAME_PATHS).as_deref());

    let encryption_or_class = match device_type.family() {
        DeviceFamily::Wifi => encryption(&attrs),
        DeviceFamily::Bluetooth => sanitize_string(string_at(&attrs, BT_CLASS_PATHS).as_deref()),
        DeviceFamily::Other => UNKNOWN.to_string(),
    };

    let is_drone_candidate = is_drone_candidate(&display_name, &identity, device_type);

    Ok(DeviceSighting {
        identity,
        device_type,
        display_name,
        encryption_or_class,
        latitude,
        longitude,
        observed_at,
        is_drone_candidate,
    })
}

/// Normalize one `alerts` row.
///
/// Missing or invalid coordinates are not an error; the alert is left
/// [`LocationSource::Unresolved`] for the locator.
pub fn normalize_alert(row: &AlertRow) -> Result<AlertEvent, SnooprError> {
    let occurred_at = alert_timestamp(row.ts_sec, row.ts_usec)?;
    let attrs = decode_blob(row.json.as_ref().ok_or(SnooprError::MissingBlob)?)?;

    let identity = row_identity(row.devmac.as_deref(), &attrs, ALERT_MAC_PATHS);
    let alert_type = string_at(&attrs, ALERT_NAME_PATHS)
        .or_else(|| row.header.clone().filter(|h| !h.is_empty()))
        .unwrap_or_else(|| UNKNOWN_ALERT.to_string());
    let message =
        string_at(&attrs, ALERT_TEXT_PATHS).unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let position = validate_coordinates(row.lat, row.lon)
        .ok()
        .or_else(|| blob_location(&attrs));

    Ok(AlertEvent {
        identity,
        alert_type: sanitize_string(Some(alert_type.as_str())),
        message: sanitize_string(Some(message.as_str())),
        phy: sanitize_string(row.phyname.as_deref()),
        occurred_at,
        latitude: position.map(|(lat, _)| lat),
        longitude: position.map(|(_, lon)| lon),
        location_source: if position.is_some() {
            LocationSource::Measured
        } else {
            LocationSource::Unresolved
        },
    })
}

/// Normalize a batch of device rows, skipping bad records.
pub fn normalize_devices(rows: &[DeviceRow]) -> Normalized<DeviceSighting> {
    let mut batch = Normalized::default();

    for row in rows {
        match normalize_device(row) {
            Ok(sighting) => {
                debug!(
                    "Device added: {}, type: {}, location: ({}, {})",
                    sighting.identity,
                    sighting.device_type.label(),
                    sighting.latitude,
                    sighting.longitude
                );
                batch.records.push(sighting);
            }
            Err(e) => {
                let identity = HardwareAddress::from(row.devmac.as_deref());
                warn!("Skipping device {}: {}", identity, e);
                batch.rejected.push(Rejection {
                    identity,
                    reason: e,
                });
            }
        }
    }

    info!(
        "Normalized {} of {} device records ({} rejected)",
        batch.records.len(),
        rows.len(),
        batch.rejected.len()
    );
    batch
}

/// Normalize a batch of alert rows, skipping bad records.
pub fn normalize_alerts(rows: &[AlertRow]) -> Normalized<AlertEvent> {
    let mut batch = Normalized::default();

    for row in rows {
        match normalize_alert(row) {
            Ok(alert) => {
                debug!(
                    "Alert added: {}, device: {}, location: {:?}",
                    alert.alert_type,
                    alert.identity,
                    alert.latitude.zip(alert.longitude)
                );
                batch.records.push(alert);
            }
            Err(e) => {
                let identity = HardwareAddress::from(row.devmac.as_deref());
                warn!("Skipping alert for {}: {}", identity, e);
                batch.rejected.push(Rejection {
                    identity,
                    reason: e,
                });
            }
        }
    }

    info!(
        "Normalized {} of {} alert records ({} rejected)",
        batch.records.len(),
        rows.len(),
        batch.rejected.len()
    );
    batch
}

fn string_at(attrs: &Value, strategies: &[KeyPath]) -> Option<String> {
    first_present(attrs, strategies).and_then(value_to_string)
}

fn row_identity(devmac: Option<&str>, attrs: &Value, strategies: &[KeyPath]) -> HardwareAddress {
    match devmac.filter(|mac| !mac.trim().is_empty()) {
        Some(mac) => HardwareAddress::from(mac),
        None => HardwareAddress::from(string_at(attrs, strategies).as_deref()),
    }
}

/// Wi-Fi crypt field: a string, or a list of cipher names joined by ", ".
fn encryption(attrs: &Value) -> String {
    let crypt = match first_present(attrs, CRYPT_PATHS) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(ciphers)) => Some(
            ciphers
                .iter()
                .filter_map(value_to_string)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    };
    sanitize_string(crypt.as_deref())
}

/// Location embedded in an alert blob: a `[lon, lat]` geopoint or
/// separate lat/lon fields.
fn blob_location(attrs: &Value) -> Option<(f64, f64)> {
    if let Some(Value::Array(point)) = first_present(attrs, ALERT_GEOPOINT_PATHS) {
        if let [lon, lat] = point.as_slice() {
            if let Ok(position) = validate_coordinates(value_to_float(lat), value_to_float(lon)) {
                return Some(position);
            }
        }
    }

    let lat = first_present(attrs, ALERT_LAT_PATHS).and_then(value_to_float);
    let lon = first_present(attrs, ALERT_LON_PATHS).and_then(value_to_float);
    validate_coordinates(lat, lon).ok()
}

/// Capture times are Unix seconds; anything before the epoch is corrupt.
fn timestamp_from_secs(secs: i64) -> Result<DateTime<Utc>, SnooprError> {
    if secs < 0 {
        return Err(SnooprError::InvalidTimestamp(secs.to_string()));
    }
    DateTime::from_timestamp(secs, 0).ok_or_else(|| SnooprError::InvalidTimestamp(secs.to_string()))
}

fn alert_timestamp(
    ts_sec: Option<i64>,
    ts_usec: Option<i64>,
) -> Result<Option<DateTime<Utc>>, SnooprError> {
    let Some(sec) = ts_sec else {
        return Ok(None);
    };
    let usec = ts_usec.unwrap_or(0);
    let invalid = || SnooprError::InvalidTimestamp(format!("{sec}.{usec:06}"));

    if sec < 0 || !(0..1_000_000).contains(&usec) {
        return Err(invalid());
    }
    DateTime::from_timestamp(sec, (usec * 1_000) as u32)
        .map(Some)
        .ok_or_else(invalid)
}

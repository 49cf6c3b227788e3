//! Data models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sanitize::sanitize_string;

/// Identity used when a record carries no hardware address.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Hardware (MAC) address
///
/// Sanitized and lowercased, so it can be used directly as a join key
/// between sightings and alerts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HardwareAddress(String);

impl From<&str> for HardwareAddress {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Self::unknown();
        }
        Self(sanitize_string(Some(trimmed)).to_lowercase())
    }
}

impl From<Option<&str>> for HardwareAddress {
    fn from(value: Option<&str>) -> Self {
        value.map_or_else(Self::unknown, |s| Self::from(s))
    }
}

impl HardwareAddress {
    pub fn unknown() -> Self {
        Self(UNKNOWN_IDENTITY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Vendor prefix: the first three octet groups, e.g. `60:60:1f`.
    pub fn oui(&self) -> Option<&str> {
        let mut end = 0;
        for (i, group) in self.0.split(':').take(3).enumerate() {
            if group.is_empty() {
                return None;
            }
            end += group.len() + usize::from(i > 0);
            if i == 2 {
                return Some(&self.0[..end]);
            }
        }
        None
    }
}

impl std::fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Broad radio family, decides where the secondary classifier comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFamily {
    Wifi,
    Bluetooth,
    Other,
}

/// Canonical device classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceKind {
    #[serde(rename = "wi-fi ap")]
    WifiAccessPoint,
    #[serde(rename = "wi-fi client")]
    WifiClient,
    #[serde(rename = "wi-fi bridged")]
    WifiBridged,
    #[serde(rename = "wi-fi ad-hoc")]
    WifiAdHoc,
    #[serde(rename = "wi-fi device")]
    WifiDevice,
    #[serde(rename = "bluetooth")]
    Bluetooth,
    #[serde(rename = "btle")]
    Btle,
    #[serde(rename = "ads-b")]
    AdsB,
    #[serde(rename = "rtl433")]
    Rtl433,
    #[serde(rename = "uav")]
    Uav,
    #[serde(rename = "unknown")]
    Unknown,
}

impl DeviceKind {
    /// Canonical lowercase classification string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::WifiAccessPoint => "wi-fi ap",
            DeviceKind::WifiClient => "wi-fi client",
            DeviceKind::WifiBridged => "wi-fi bridged",
            DeviceKind::WifiAdHoc => "wi-fi ad-hoc",
            DeviceKind::WifiDevice => "wi-fi device",
            DeviceKind::Bluetooth => "bluetooth",
            DeviceKind::Btle => "btle",
            DeviceKind::AdsB => "ads-b",
            DeviceKind::Rtl433 => "rtl433",
            DeviceKind::Uav => "uav",
            DeviceKind::Unknown => "unknown",
        }
    }

    /// Default descriptive label for display.
    pub fn label(&self) -> &'static str {
        match self {
            DeviceKind::WifiAccessPoint => "Wi-Fi Access Point",
            DeviceKind::WifiClient => "Wi-Fi Client",
            DeviceKind::WifiBridged => "Wi-Fi Bridged Device",
            DeviceKind::WifiAdHoc => "Wi-Fi Ad-Hoc Device",
            DeviceKind::WifiDevice => "Wi-Fi Device",
            DeviceKind::Bluetooth => "Bluetooth Device",
            DeviceKind::Btle => "Bluetooth LE Device",
            DeviceKind::AdsB => "ADS-B Aircraft",
            DeviceKind::Rtl433 => "RTL433 Sensor",
            DeviceKind::Uav => "UAV / Drone",
            DeviceKind::Unknown => "Unknown Device",
        }
    }

    pub fn family(&self) -> DeviceFamily {
        match self {
            DeviceKind::WifiAccessPoint
            | DeviceKind::WifiClient
            | DeviceKind::WifiBridged
            | DeviceKind::WifiAdHoc
            | DeviceKind::WifiDevice => DeviceFamily::Wifi,
            DeviceKind::Bluetooth | DeviceKind::Btle => DeviceFamily::Bluetooth,
            DeviceKind::AdsB | DeviceKind::Rtl433 | DeviceKind::Uav | DeviceKind::Unknown => {
                DeviceFamily::Other
            }
        }
    }
}

/// One observation of a device at a point in time.
///
/// Only constructed with validated coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSighting {
    pub identity: HardwareAddress,
    pub device_type: DeviceKind,
    pub display_name: String,
    pub encryption_or_class: String,
    pub latitude: f64,
    pub longitude: f64,
    pub observed_at: Option<DateTime<Utc>>,
    pub is_drone_candidate: bool,
}

impl DeviceSighting {
    /// Ordering key in microseconds; a missing timestamp sorts as the epoch.
    pub fn time_key(&self) -> i64 {
        time_key(self.observed_at)
    }
}

pub(crate) fn time_key(time: Option<DateTime<Utc>>) -> i64 {
    time.map_or(0, |t| t.timestamp_micros())
}

/// Where an alert's coordinates came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationSource {
    /// The alert carried its own valid fix
    Measured,
    /// Offset from the latest device fix at or before the alert
    PrecedingSighting { identity: HardwareAddress },
    /// Offset from the earliest known device fix
    EarliestSighting { identity: HardwareAddress },
    /// Caller-supplied map center
    MapCenter,
    /// Not resolved yet
    Unresolved,
}

impl LocationSource {
    pub fn is_synthetic(&self) -> bool {
        !matches!(self, LocationSource::Measured)
    }
}

/// One security alert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub identity: HardwareAddress,
    pub alert_type: String,
    pub message: String,
    pub phy: String,
    pub occurred_at: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_source: LocationSource,
}

/// Time-ordered sightings for one device identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceTrack {
    identity: HardwareAddress,
    sightings: Vec<DeviceSighting>,
}

impl DeviceTrack {
    /// Build a track, sorting ascending by timestamp (missing first).
    pub(crate) fn new(identity: HardwareAddress, mut sightings: Vec<DeviceSighting>) -> Self {
        sightings.sort_by_key(DeviceSighting::time_key);
        Self {
            identity,
            sightings,
        }
    }

    pub fn identity(&self) -> &HardwareAddress {
        &self.identity
    }

    pub fn sightings(&self) -> &[DeviceSighting] {
        &self.sightings
    }

    pub fn len(&self) -> usize {
        self.sightings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sightings.is_empty()
    }

    pub fn latest(&self) -> Option<&DeviceSighting> {
        self.sightings.last()
    }
}

/// A device whose movement crossed the detection threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnooperFinding {
    pub identity: HardwareAddress,
    pub track: DeviceTrack,
    /// Distance between the two fixes that crossed the threshold
    pub trigger_distance_miles: f64,
    /// Seconds between the two fixes that crossed the threshold
    pub trigger_elapsed_secs: i64,
}

impl SnooperFinding {
    /// Most recent fix of the device, the position to mark.
    pub fn latest_sighting(&self) -> Option<&DeviceSighting> {
        self.track.latest()
    }
}

//! Fixed device-type and drone lookup tables.

use crate::models::{DeviceKind, HardwareAddress};

/// Raw lowercase Kismet type -> canonical kind.
static DEVICE_TYPES: &[(&str, DeviceKind)] = &[
    ("wi-fi ap", DeviceKind::WifiAccessPoint),
    ("wi-fi base station", DeviceKind::WifiAccessPoint),
    ("wi-fi client", DeviceKind::WifiClient),
    ("wi-fi client device", DeviceKind::WifiClient),
    ("wi-fi bridged", DeviceKind::WifiBridged),
    ("wi-fi ad-hoc", DeviceKind::WifiAdHoc),
    ("wi-fi device", DeviceKind::WifiDevice),
    ("bluetooth", DeviceKind::Bluetooth),
    ("br/edr", DeviceKind::Bluetooth),
    ("btle", DeviceKind::Btle),
    ("bluetooth le", DeviceKind::Btle),
    ("bluetooth low energy device", DeviceKind::Btle),
    ("ads-b", DeviceKind::AdsB),
    ("rtl433", DeviceKind::Rtl433),
    ("uav", DeviceKind::Uav),
    ("drone", DeviceKind::Uav),
];

/// Manufacturer SSID fragments, uppercase.
static DRONE_SSID_MARKERS: &[&str] = &[
    "DJI",
    "TELLO",
    "MAVIC",
    "PHANTOM",
    "PARROT",
    "ANAFI",
    "BEBOP",
    "SKYDIO",
    "AUTEL",
    "YUNEEC",
    "HOLY STONE",
];

/// Drone vendor OUIs, lowercase.
static DRONE_OUIS: &[&str] = &[
    // DJI
    "60:60:1f",
    "34:d2:62",
    "48:1c:b9",
    "e4:7a:2c",
    // Parrot
    "90:3a:e6",
    "a0:14:3d",
    "00:12:1c",
    "00:26:7e",
    // Skydio
    "38:1d:14",
    // Autel
    "e8:90:0b",
];

/// Classify a raw device type string; unmapped types are `Unknown`.
pub fn classify(raw_type: &str) -> DeviceKind {
    let key = raw_type.trim().to_lowercase();
    DEVICE_TYPES
        .iter()
        .find(|(name, _)| *name == key)
        .map_or(DeviceKind::Unknown, |(_, kind)| *kind)
}

/// Heuristic drone check on display name, vendor prefix and kind.
pub fn is_drone_candidate(name: &str, mac: &HardwareAddress, kind: DeviceKind) -> bool {
    if kind == DeviceKind::Uav {
        return true;
    }

    let upper = name.to_uppercase();
    if DRONE_SSID_MARKERS.iter().any(|marker| upper.contains(marker)) {
        return true;
    }

    mac.oui()
        .is_some_and(|oui| DRONE_OUIS.iter().any(|known| known.eq_ignore_ascii_case(oui)))
}

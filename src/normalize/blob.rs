//! Attribute blob decoding and key-path extraction.
//!
//! Kismet keys are namespaced with dots (`kismet.device.base.name`), so a
//! path is a list of whole keys rather than a dotted string.

use serde_json::Value;

use crate::{database::models::RawBlob, errors::SnooprError};

/// One extraction strategy: keys followed from the blob root.
pub type KeyPath = &'static [&'static str];

pub const MAC_PATHS: &[KeyPath] = &[&["kismet.device.base.macaddr"]];

pub const TYPE_PATHS: &[KeyPath] = &[&["kismet.device.base.type"]];

pub const NAME_PATHS: &[KeyPath] = &[
    &["kismet.device.base.name"],
    &["kismet.device.base.commonname"],
    &[
        "dot11.device",
        "dot11.device.last_beaconed_ssid_record",
        "dot11.advertisedssid.ssid",
    ],
];

pub const CRYPT_PATHS: &[KeyPath] = &[
    &["kismet.device.base.crypt"],
    &[
        "dot11.device",
        "dot11.device.last_beaconed_ssid",
        "dot11.ssid.cryptset",
    ],
];

pub const BT_CLASS_PATHS: &[KeyPath] = &[
    &["kismet.device.base.bluetooth.device_class"],
    &["bluetooth.device", "bluetooth.device.class"],
];

pub const ALERT_NAME_PATHS: &[KeyPath] = &[&["kismet.alert.name"], &["kismet.alert.class"]];

pub const ALERT_TEXT_PATHS: &[KeyPath] = &[&["kismet.alert.description"], &["kismet.alert.text"]];

pub const ALERT_MAC_PATHS: &[KeyPath] = &[
    &["kismet.alert.source_mac"],
    &["kismet.alert.transmitter_mac"],
];

pub const ALERT_GEOPOINT_PATHS: &[KeyPath] = &[&[
    "kismet.alert.location",
    "kismet.common.location.geopoint",
]];

pub const ALERT_LAT_PATHS: &[KeyPath] = &[
    &["kismet.alert.location", "kismet.common.location.lat"],
    &["kismet.alert.lat"],
];

pub const ALERT_LON_PATHS: &[KeyPath] = &[
    &["kismet.alert.location", "kismet.common.location.lon"],
    &["kismet.alert.lon"],
];

/// Decode a raw blob into a JSON object.
pub fn decode_blob(blob: &RawBlob) -> Result<Value, SnooprError> {
    let text = match blob {
        RawBlob::Bytes(bytes) => std::str::from_utf8(bytes)?,
        RawBlob::Text(text) => text.as_str(),
    };
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(SnooprError::BlobNotObject);
    }
    Ok(value)
}

/// Follow `path` from `data`, one whole key per step.
pub fn resolve_key_path<'a>(data: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(data, |current, key| current.as_object()?.get(*key))
}

/// First strategy in `strategies` that yields a present value.
///
/// Null, empty strings, empty arrays and empty objects count as absent.
pub fn first_present<'a>(data: &'a Value, strategies: &[KeyPath]) -> Option<&'a Value> {
    strategies
        .iter()
        .filter_map(|path| resolve_key_path(data, path))
        .find(|value| is_present(value))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Scalar value as text; arrays and objects are not scalars.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric value, accepting numbers stored as strings.
pub fn value_to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

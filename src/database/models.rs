// src/database/models.rs

/// Nested attribute blob as stored by the capture.
///
/// Kismet writes the `device` and `json` columns as BLOBs, but some
/// captures and converted databases hold them as TEXT.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBlob {
    Bytes(Vec<u8>),
    Text(String),
}

impl From<&str> for RawBlob {
    fn from(value: &str) -> Self {
        RawBlob::Text(value.to_string())
    }
}

impl From<Vec<u8>> for RawBlob {
    fn from(value: Vec<u8>) -> Self {
        RawBlob::Bytes(value)
    }
}

/// Row of the `devices` table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceRow {
    pub devmac: Option<String>,
    pub min_lat: Option<f64>,
    pub min_lon: Option<f64>,
    pub device: Option<RawBlob>,
    /// Last observation, seconds from Unix epoch
    pub last_time: Option<i64>,
}

/// Row of the `alerts` table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertRow {
    pub ts_sec: Option<i64>,
    pub ts_usec: Option<i64>,
    pub phyname: Option<String>,
    pub devmac: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub header: Option<String>,
    pub json: Option<RawBlob>,
}

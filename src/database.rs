// src/database.rs
pub mod models;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Row, SqlitePool,
};
use tracing::{error, info, warn};

use crate::errors::SnooprError;
use models::{AlertRow, DeviceRow, RawBlob};

const CAPTURE_EXTENSION: &str = "kismet";

/// Read-only access to a Kismet `.kismet` capture
pub struct KismetDatabase {
    pool: SqlitePool,
}

impl KismetDatabase {
    /// Open an existing capture read-only
    pub async fn open(path: &Path) -> Result<Self, SnooprError> {
        if !path.is_file() {
            error!("Capture file '{}' does not exist", path.display());
            return Err(SnooprError::CaptureMissing(path.to_path_buf()));
        }

        info!("Opening Kismet capture at {}", path.display());
        let options = SqliteConnectOptions::new().filename(path).read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                error!("Failed to open capture: {}", e);
                e
            })?;

        Ok(Self::new(pool))
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All rows of the `devices` table.
    ///
    /// Rows whose columns cannot be decoded are logged and skipped.
    pub async fn fetch_devices(&self) -> Result<Vec<DeviceRow>, SnooprError> {
        let rows = sqlx::query("SELECT devmac, min_lat, min_lon, device, last_time FROM devices")
            .fetch_all(&self.pool)
            .await?;
        info!("Fetched {} device records from the capture", rows.len());

        Ok(rows
            .iter()
            .filter_map(|row| {
                Self::device_row(row)
                    .map_err(|e| warn!("Skipping undecodable device row: {}", e))
                    .ok()
            })
            .collect())
    }

    /// All rows of the `alerts` table.
    pub async fn fetch_alerts(&self) -> Result<Vec<AlertRow>, SnooprError> {
        let rows = sqlx::query(
            "SELECT ts_sec, ts_usec, phyname, devmac, lat, lon, header, json FROM alerts",
        )
        .fetch_all(&self.pool)
        .await?;
        info!("Fetched {} alert records from the capture", rows.len());

        Ok(rows
            .iter()
            .filter_map(|row| {
                Self::alert_row(row)
                    .map_err(|e| warn!("Skipping undecodable alert row: {}", e))
                    .ok()
            })
            .collect())
    }

    fn device_row(row: &SqliteRow) -> Result<DeviceRow, sqlx::Error> {
        Ok(DeviceRow {
            devmac: row.try_get("devmac")?,
            min_lat: row.try_get("min_lat")?,
            min_lon: row.try_get("min_lon")?,
            device: blob_column(row, "device")?,
            last_time: row.try_get("last_time")?,
        })
    }

    fn alert_row(row: &SqliteRow) -> Result<AlertRow, sqlx::Error> {
        Ok(AlertRow {
            ts_sec: row.try_get("ts_sec")?,
            ts_usec: row.try_get("ts_usec")?,
            phyname: row.try_get("phyname")?,
            devmac: row.try_get("devmac")?,
            lat: row.try_get("lat")?,
            lon: row.try_get("lon")?,
            header: row.try_get("header")?,
            json: blob_column(row, "json")?,
        })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Blob column stored either as BLOB or as TEXT
fn blob_column(row: &SqliteRow, column: &str) -> Result<Option<RawBlob>, sqlx::Error> {
    match row.try_get::<Option<Vec<u8>>, _>(column) {
        Ok(bytes) => Ok(bytes.map(RawBlob::Bytes)),
        Err(_) => Ok(row
            .try_get::<Option<String>, _>(column)?
            .map(RawBlob::Text)),
    }
}

/// Most recently modified `.kismet` file in `dir`
pub fn find_most_recent_capture(dir: &Path) -> Result<PathBuf, SnooprError> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_capture = path.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(CAPTURE_EXTENSION);
        if !is_capture {
            continue;
        }

        let modified = path.metadata()?.modified()?;
        if newest.as_ref().map_or(true, |(time, _)| modified > *time) {
            newest = Some((modified, path));
        }
    }

    match newest {
        Some((_, path)) => {
            info!("Most recent Kismet capture found: {}", path.display());
            Ok(path)
        }
        None => {
            error!("No .kismet files found in {}", dir.display());
            Err(SnooprError::CaptureNotFound(dir.to_path_buf()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::tempdir;

    fn touch(path: &Path, age: Duration) -> std::io::Result<()> {
        let file = File::create(path)?;
        file.set_modified(SystemTime::now() - age)
    }

    #[test]
    fn test_find_most_recent_capture() -> Result<(), SnooprError> {
        let dir = tempdir()?;
        touch(&dir.path().join("Kismet-old.kismet"), Duration::from_secs(3600))?;
        touch(&dir.path().join("Kismet-new.kismet"), Duration::from_secs(10))?;
        touch(&dir.path().join("newest.txt"), Duration::ZERO)?;

        let found = find_most_recent_capture(dir.path())?;
        assert_eq!(found, dir.path().join("Kismet-new.kismet"));
        Ok(())
    }

    #[test]
    fn test_no_capture_found() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            find_most_recent_capture(dir.path()),
            Err(SnooprError::CaptureNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let result = KismetDatabase::open(&dir.path().join("absent.kismet")).await;
        assert!(matches!(result, Err(SnooprError::CaptureMissing(_))));
    }
}

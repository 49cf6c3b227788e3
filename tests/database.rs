use std::path::Path;

use sqlx::{sqlite::SqliteConnectOptions, Connection, SqliteConnection};
use tempfile::tempdir;

use snoopr::{
    config::{DetectionConfig, LocatorConfig},
    database::{models::RawBlob, KismetDatabase},
    models::{DeviceKind, LocationSource},
    pipeline::analyze,
};

async fn setup_capture(path: &Path) -> SqliteConnection {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .expect("Failed to create capture");

    sqlx::query(
        "CREATE TABLE devices (
            first_time INT, last_time INT, devkey TEXT, phyname TEXT, devmac TEXT,
            strongest_signal INT, min_lat REAL, min_lon REAL, max_lat REAL, max_lon REAL,
            avg_lat REAL, avg_lon REAL, bytes_data INT, type TEXT, device BLOB
        )",
    )
    .execute(&mut conn)
    .await
    .expect("Failed to create devices table");

    sqlx::query(
        "CREATE TABLE alerts (
            ts_sec INT, ts_usec INT, phyname TEXT, devmac TEXT,
            lat REAL, lon REAL, header TEXT, json BLOB
        )",
    )
    .execute(&mut conn)
    .await
    .expect("Failed to create alerts table");

    conn
}

async fn insert_device(
    conn: &mut SqliteConnection,
    mac: &str,
    lat: f64,
    lon: f64,
    last_time: i64,
    device: &str,
) {
    sqlx::query("INSERT INTO devices (devmac, min_lat, min_lon, last_time, device) VALUES (?, ?, ?, ?, ?)")
        .bind(mac)
        .bind(lat)
        .bind(lon)
        .bind(last_time)
        .bind(device.as_bytes())
        .execute(conn)
        .await
        .expect("Failed to insert device");
}

#[tokio::test]
async fn test_read_capture_and_analyze() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Kismet-20240101-00-00-00.kismet");
    let mut conn = setup_capture(&path).await;

    let ap = r#"{"kismet.device.base.type": "Wi-Fi AP", "kismet.device.base.name": "HomeNet",
                 "kismet.device.base.crypt": "WPA2-PSK"}"#;
    let client = r#"{"kismet.device.base.type": "Wi-Fi Client"}"#;

    insert_device(&mut conn, "AA:BB:CC:00:00:01", 40.0, -73.0, 1_000, ap).await;
    insert_device(&mut conn, "AA:BB:CC:00:00:02", 40.0, -73.0, 1_000, client).await;
    insert_device(&mut conn, "AA:BB:CC:00:00:02", 40.03, -73.0, 1_600, client).await;
    insert_device(&mut conn, "AA:BB:CC:00:00:03", 0.0, 0.0, 1_000, client).await;
    insert_device(&mut conn, "AA:BB:CC:00:00:04", 40.0, -73.0, 1_000, "{broken").await;

    // Blob stored as TEXT
    sqlx::query("INSERT INTO devices (devmac, min_lat, min_lon, last_time, device) VALUES (?, ?, ?, ?, ?)")
        .bind("60:60:1F:00:00:05")
        .bind(40.1)
        .bind(-73.1)
        .bind(900_i64)
        .bind(r#"{"kismet.device.base.type": "Wi-Fi Client"}"#)
        .execute(&mut conn)
        .await
        .expect("Failed to insert text blob device");

    sqlx::query("INSERT INTO alerts (ts_sec, ts_usec, phyname, devmac, lat, lon, header, json) VALUES (?, ?, ?, ?, ?, ?, ?, ?)")
        .bind(1_300_i64)
        .bind(500_000_i64)
        .bind("IEEE802.11")
        .bind("AA:BB:CC:00:00:09")
        .bind(0.0)
        .bind(0.0)
        .bind("DEAUTHFLOOD")
        .bind(r#"{"kismet.alert.description": "Deauth flood"}"#.as_bytes())
        .execute(&mut conn)
        .await
        .expect("Failed to insert alert");

    conn.close().await.unwrap();

    let db = KismetDatabase::open(&path).await.unwrap();
    let devices = db.fetch_devices().await.unwrap();
    let alerts = db.fetch_alerts().await.unwrap();
    db.close().await;

    assert_eq!(devices.len(), 6);
    assert_eq!(alerts.len(), 1);
    assert!(matches!(devices[0].device, Some(RawBlob::Bytes(_))));

    let analysis = analyze(
        &devices,
        &alerts,
        &DetectionConfig::default(),
        &LocatorConfig::default(),
    )
    .unwrap();

    assert_eq!(analysis.devices.len(), 4);
    assert_eq!(analysis.rejected_devices, 2);

    let ap = &analysis.devices[0];
    assert_eq!(ap.identity.as_str(), "aa:bb:cc:00:00:01");
    assert_eq!(ap.device_type, DeviceKind::WifiAccessPoint);
    assert_eq!(ap.encryption_or_class, "WPA2-PSK");

    let drone = analysis
        .devices
        .iter()
        .find(|d| d.identity.as_str() == "60:60:1f:00:00:05")
        .unwrap();
    assert!(drone.is_drone_candidate);

    assert_eq!(analysis.snoopers.len(), 1);
    assert_eq!(analysis.snoopers[0].identity.as_str(), "aa:bb:cc:00:00:02");
    assert_eq!(analysis.snoopers[0].trigger_elapsed_secs, 600);

    let alert = &analysis.alerts[0];
    assert_eq!(alert.alert_type, "DEAUTHFLOOD");
    assert_eq!(alert.message, "Deauth flood");
    assert!(alert.location_source.is_synthetic());
    assert!(matches!(
        alert.location_source,
        LocationSource::PrecedingSighting { .. }
    ));
    assert!((alert.latitude.unwrap() - 40.0003).abs() < 1e-9);
}

#[tokio::test]
async fn test_empty_capture() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.kismet");
    setup_capture(&path).await.close().await.unwrap();

    let db = KismetDatabase::open(&path).await.unwrap();
    assert!(db.fetch_devices().await.unwrap().is_empty());
    assert!(db.fetch_alerts().await.unwrap().is_empty());
}

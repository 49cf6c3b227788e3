//! SnoopR command line utility

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use snoopr::{
    config::AppConfig,
    database::{find_most_recent_capture, KismetDatabase},
    errors::SnooprError,
    pipeline::analyze,
    report::write_report,
};

#[derive(Parser)]
#[command(name = "snoopr")]
#[command(version, about = "Detect snoopers and place alerts from a Kismet capture")]
struct Cli {
    /// Kismet capture to read. Defaults to the newest .kismet file in the
    /// configured search directory.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// JSON report output path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Distance in miles a device must move to be flagged.
    #[arg(long)]
    distance_threshold: Option<f64>,

    /// Time window in seconds for comparing sightings.
    #[arg(long)]
    time_threshold: Option<u64>,
}

impl Cli {
    /// Apply command line overrides on top of file and environment config
    fn apply(self, config: &mut AppConfig) {
        if let Some(path) = self.db_path {
            config.capture.path = Some(path);
        }
        if let Some(path) = self.output {
            config.output.path = path;
        }
        if let Some(miles) = self.distance_threshold {
            config.detection.distance_threshold_miles = miles;
        }
        if let Some(secs) = self.time_threshold {
            config.detection.time_window = Duration::from_secs(secs);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), SnooprError> {
    #[cfg(feature = "dotenvy")]
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    cli.apply(&mut config);
    config.validate()?;

    let capture = match config.capture.path.clone() {
        Some(path) => path,
        None => find_most_recent_capture(&config.capture.search_dir)?,
    };
    info!("Using Kismet capture: {}", capture.display());

    let db = KismetDatabase::open(&capture).await?;
    let device_rows = db.fetch_devices().await?;
    let alert_rows = db.fetch_alerts().await?;
    db.close().await;

    let analysis = match analyze(&device_rows, &alert_rows, &config.detection, &config.locator) {
        Ok(analysis) => analysis,
        Err(SnooprError::NoUsableInput) => {
            warn!("No devices or alerts to report");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    for finding in &analysis.snoopers {
        if let Some(latest) = finding.latest_sighting() {
            info!(
                "Snooper {}: last seen at ({}, {}), {:?}",
                finding.identity, latest.latitude, latest.longitude, latest.observed_at
            );
        }
    }

    write_report(&config.output.path, &analysis)?;
    info!("SnoopR completed");

    Ok(())
}

//! JSON hand-off for the map renderer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{error, info};

use crate::{errors::SnooprError, pipeline::Analysis};

/// Write `analysis` as pretty-printed JSON to `path`.
pub fn write_report(path: &Path, analysis: &Analysis) -> Result<(), SnooprError> {
    let file = File::create(path).map_err(|e| {
        error!("Failed to create report {}: {}", path.display(), e);
        e
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, analysis)?;
    writer.flush()?;

    info!("Report saved to {}", path.display());
    Ok(())
}

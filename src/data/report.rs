//! Persisting per-stratum report rows.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::stats::StratifiedReport;

/// Write one CSV row per stratum to `dest`.
pub fn persist_report(report: &StratifiedReport, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer =
        csv::Writer::from_path(dest).with_context(|| format!("create {}", dest.display()))?;
    for row in &report.strata {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %dest.display(), rows = report.strata.len(), "wrote stratum report");
    Ok(())
}

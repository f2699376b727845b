//! Report export - JSON for whole reports, a plain table for rankings.

use crate::pipeline::SpectralReport;
use spectra_core::error::Result;
use spectra_core::types::RankedNode;
use std::io::Write;
use std::path::Path;

/// Pretty-printed JSON for a report.
pub fn report_to_json(report: &SpectralReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write a report as JSON.
pub fn save_report(report: &SpectralReport, path: &Path) -> Result<()> {
    std::fs::write(path, report_to_json(report)?)?;
    Ok(())
}

/// Read a report written by [`save_report`].
pub fn load_report(path: &Path) -> Result<SpectralReport> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Write `rank<TAB>name<TAB>in_degree` lines, ranks starting at 1.
pub fn write_ranking<W: Write>(ranking: &[RankedNode], mut out: W) -> Result<()> {
    for (i, node) in ranking.iter().enumerate() {
        writeln!(out, "{}\t{}\t{}", i + 1, node.name, node.in_degree)?;
    }
    Ok(())
}

//! Export likelihood scans to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or plotting scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::ScanPoint;
use crate::error::AppError;

/// Write scan points to a CSV file.
pub fn write_scan_csv(path: &Path, points: &[ScanPoint]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    write_scan(&mut out, points)
        .and_then(|()| out.flush())
        .map_err(|e| AppError::io(format!("Failed to write export CSV '{}': {e}", path.display())))
}

fn write_scan<W: Write>(out: &mut W, points: &[ScanPoint]) -> std::io::Result<()> {
    writeln!(out, "omega_b,dneff,logp,chi2")?;
    for p in points {
        writeln!(out, "{:.8},{:.6},{:.10},{:.10}", p.ombh2, p.dneff, p.logp, -2.0 * p.logp)?;
    }
    Ok(())
}

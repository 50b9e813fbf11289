//! CDF artifact: `percentile,latency_<unit>` CSV with four decimals.

use crate::error::{Result, TailbenchError};
use crate::model::{CdfCurve, CdfPoint, Unit};
use crate::util::write_atomic;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Header line for a curve in `unit`.
#[must_use]
pub fn header(unit: Unit) -> String {
    format!("percentile,latency_{unit}")
}

/// Write the curve as CSV to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_cdf_to<W: Write>(writer: &mut W, curve: &CdfCurve) -> io::Result<()> {
    writeln!(writer, "{}", header(curve.unit))?;
    for point in &curve.points {
        writeln!(writer, "{:.4},{:.4}", point.percentile, point.latency)?;
    }
    Ok(())
}

/// Render the curve as a CSV string.
#[must_use]
pub fn format_cdf(curve: &CdfCurve) -> String {
    let mut buf = Vec::with_capacity(curve.points.len() * 24);
    // Writing to a Vec cannot fail.
    let _ = write_cdf_to(&mut buf, curve);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write a CDF file atomically.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_cdf(path: &Path, curve: &CdfCurve) -> Result<()> {
    write_atomic(path, format_cdf(curve).as_bytes())
}

/// Load a CDF file written by [`write_cdf`].
///
/// The unit is taken from the header; lines with fewer than two fields are
/// ignored.
///
/// # Errors
///
/// Returns `CdfParse` if a data line holds a non-numeric field, or an I/O
/// error if the file cannot be read.
pub fn load_cdf(path: &Path) -> Result<CdfCurve> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines();

    let unit = match lines.next().transpose()? {
        Some(header) => header
            .trim()
            .rsplit_once("latency_")
            .and_then(|(_, unit)| unit.parse().ok())
            .unwrap_or_default(),
        None => Unit::default(),
    };

    let mut points = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line?;
        let mut fields = line.trim().split(',');
        let (Some(p), Some(latency)) = (fields.next(), fields.next()) else {
            continue;
        };
        let parse = |field: &str| {
            field
                .trim()
                .parse::<f64>()
                .map_err(|e| TailbenchError::CdfParse {
                    path: path.to_path_buf(),
                    line: idx + 2,
                    reason: format!("'{field}': {e}"),
                })
        };
        points.push(CdfPoint {
            percentile: parse(p)?,
            latency: parse(latency)?,
        });
    }

    Ok(CdfCurve { unit, points })
}

//! Fixed-resolution CDF generation.
//!
//! The curve has `points + 1` entries at percentiles `i / points * 100`. Each
//! entry reads `sorted[min(floor(p / 100 * n), n - 1)]`, so the last point is
//! always the maximum and latencies never decrease.

use super::SortedSamples;
use crate::error::{Result, TailbenchError};
use crate::model::{CdfCurve, CdfPoint};

/// Generate a CDF curve with `points` steps.
///
/// # Errors
///
/// Returns `InvalidCdfPoints` if `points` is zero.
pub fn generate_cdf(samples: &SortedSamples, points: usize) -> Result<CdfCurve> {
    if points == 0 {
        return Err(TailbenchError::InvalidCdfPoints { points });
    }

    let sorted = samples.as_slice();
    let n = sorted.len();
    let curve = (0..=points)
        .map(|i| {
            let percentile = i as f64 / points as f64 * 100.0;
            let index = ((percentile / 100.0 * n as f64) as usize).min(n - 1);
            CdfPoint {
                percentile,
                latency: sorted[index],
            }
        })
        .collect();

    Ok(CdfCurve {
        unit: samples.unit(),
        points: curve,
    })
}

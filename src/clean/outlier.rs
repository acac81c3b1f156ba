//! Global z-score outlier flagging for consumption.
//!
//! The reference distribution is the population mean/std-dev of the whole
//! series, computed once. This pass only writes `z_score` and `is_outlier`;
//! consumption is left alone so the replacement pass sees every flag before any
//! value changes.

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{DayRecord, Flagged, Imputed, RecordSeries};

/// Default `|z|` threshold.
pub const Z_THRESHOLD: f64 = 3.0;

/// A std-dev at or below this fraction of `max(|mean|, 1)` counts as zero.
const DEGENERATE_REL_TOL: f64 = 1e-12;

/// Reference distribution of one detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub n: usize,
    pub mean: f64,
    /// Population standard deviation (divides by `n`).
    pub std_dev: f64,
    /// True when the std-dev is zero and every z-score was forced to `0`.
    pub degenerate: bool,
    pub threshold: f64,
    /// Number of flagged days.
    pub outliers: usize,
}

/// Flag outliers and advance the series to the `Flagged` stage.
pub fn detect(mut series: RecordSeries<Imputed>, threshold: f64) -> (RecordSeries<Flagged>, Distribution) {
    let dist = detect_records(series.records_mut(), threshold);
    (series.retag(), dist)
}

/// Set `z_score`/`is_outlier` on every record and return the distribution used.
pub fn detect_records(records: &mut [DayRecord], threshold: f64) -> Distribution {
    let values: Vec<f64> = records.iter().map(|r| r.consumption).collect();
    let (mean, std_dev) = population_moments(&values).unwrap_or((0.0, 0.0));

    let degenerate = !std_dev.is_finite() || std_dev <= DEGENERATE_REL_TOL * mean.abs().max(1.0);
    if degenerate && !records.is_empty() {
        warn!(n = records.len(), mean, std_dev, "zero standard deviation; z-scores set to 0");
    }

    let mut outliers = 0usize;
    for r in records.iter_mut() {
        if degenerate {
            r.z_score = 0.0;
            r.is_outlier = false;
            continue;
        }
        r.z_score = (r.consumption - mean) / std_dev;
        r.is_outlier = r.z_score.abs() > threshold;
        if r.is_outlier {
            outliers += 1;
            info!(day = r.day, consumption = r.consumption, z = r.z_score, "outlier flagged");
        }
    }

    Distribution {
        n: records.len(),
        mean,
        std_dev,
        degenerate,
        threshold,
        outliers,
    }
}

/// Population mean and standard deviation (two-pass). `None` for empty input.
pub fn population_moments(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((mean, (ss / n).sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(values: &[f64]) -> Vec<DayRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| DayRecord::with_consumption(i as u32 + 1, v))
            .collect()
    }

    #[test]
    fn identical_values_give_zero_scores() {
        for v in [10.0, 0.1, 1234.567] {
            let mut r = records(&[v; 9]);
            let dist = detect_records(&mut r, Z_THRESHOLD);
            assert!(dist.degenerate);
            assert_eq!(dist.outliers, 0);
            for rec in &r {
                assert_eq!(rec.z_score, 0.0);
                assert!(!rec.is_outlier);
            }
        }
    }

    #[test]
    fn single_record_is_degenerate() {
        let mut r = records(&[42.0]);
        let dist = detect_records(&mut r, Z_THRESHOLD);
        assert!(dist.degenerate);
        assert_eq!(dist.n, 1);
        assert_eq!(r[0].z_score, 0.0);
    }

    #[test]
    fn two_records_have_valid_std_dev() {
        let mut r = records(&[1.0, 3.0]);
        let dist = detect_records(&mut r, Z_THRESHOLD);
        assert!(!dist.degenerate);
        assert!((dist.mean - 2.0).abs() < 1e-12);
        assert!((dist.std_dev - 1.0).abs() < 1e-12);
        assert!((r[0].z_score + 1.0).abs() < 1e-12);
        assert!((r[1].z_score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn seven_day_spike_scores_root_six() {
        let mut r = records(&[10.0, 10.0, 10.0, 10.0, 100.0, 10.0, 10.0]);
        let dist = detect_records(&mut r, Z_THRESHOLD);
        assert!((dist.mean - 160.0 / 7.0).abs() < 1e-9);
        assert!(dist.std_dev > 0.0);
        assert!((r[4].z_score - 6f64.sqrt()).abs() < 1e-9);
        // below the default threshold
        assert_eq!(dist.outliers, 0);

        let dist = detect_records(&mut r, 2.0);
        assert_eq!(dist.outliers, 1);
        assert!(r[4].is_outlier);
        // flagging never touches consumption
        assert_eq!(r[4].consumption, 100.0);
    }

    #[test]
    fn longer_flat_series_flags_spike_at_default_threshold() {
        let mut values = vec![10.0; 21];
        values[10] = 100.0;
        let mut r = records(&values);
        let dist = detect_records(&mut r, Z_THRESHOLD);
        assert_eq!(dist.outliers, 1);
        assert!(r[10].is_outlier);
        assert!((r[10].z_score - 20f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn empty_input_yields_degenerate_distribution() {
        let mut r: Vec<DayRecord> = Vec::new();
        let dist = detect_records(&mut r, Z_THRESHOLD);
        assert_eq!(dist.n, 0);
        assert_eq!(dist.outliers, 0);
    }
}

//! Descriptive statistics and Pearson correlation over day records.

use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{DayRecord, Field};

/// Mean/min/max/std-dev of one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSummary {
    pub field: Field,
    pub n: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

/// Summarize a field. `None` for an empty slice.
pub fn describe(records: &[DayRecord], field: Field) -> Option<FieldSummary> {
    if records.is_empty() {
        return None;
    }
    let n = records.len();
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for r in records {
        let v = field.value(r);
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    let mean = sum / n as f64;
    let var = records.iter().map(|r| (field.value(r) - mean).powi(2)).sum::<f64>() / n as f64;

    Some(FieldSummary {
        field,
        n,
        mean,
        min,
        max,
        std_dev: var.sqrt(),
    })
}

/// Pearson correlation of `y` against `x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    pub x: Field,
    pub y: Field,
    pub r: f64,
}

/// Pearson correlation coefficient.
///
/// Returns `0.0` when either field has zero variance (or fewer than two records),
/// so a constant column reads as "no linear relationship" instead of NaN.
pub fn pearson(records: &[DayRecord], x: Field, y: Field) -> f64 {
    let n = records.len();
    if n < 2 {
        return 0.0;
    }
    let mean_x = records.iter().map(|r| x.value(r)).sum::<f64>() / n as f64;
    let mean_y = records.iter().map(|r| y.value(r)).sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for r in records {
        let dx = x.value(r) - mean_x;
        let dy = y.value(r) - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let den = (sxx * syy).sqrt();
    if den == 0.0 || !den.is_finite() {
        return 0.0;
    }
    (sxy / den).clamp(-1.0, 1.0)
}

/// Correlate every field in `fields` against `target`, preserving order.
pub fn correlations(records: &[DayRecord], target: Field, fields: &[Field]) -> Vec<Correlation> {
    fields
        .par_iter()
        .map(|&f| Correlation {
            x: target,
            y: f,
            r: pearson(records, target, f),
        })
        .collect()
}

/// Mean consumption of one group of days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupMean {
    pub n: usize,
    /// `0.0` for an empty group.
    pub mean: f64,
}

/// Business days (workday and not a holiday) vs weekends/holidays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayTypeSplit {
    pub business: GroupMean,
    pub other: GroupMean,
}

pub fn split_by_day_type(records: &[DayRecord]) -> DayTypeSplit {
    let (business, other): (Vec<&DayRecord>, Vec<&DayRecord>) =
        records.iter().partition(|r| r.is_business_day());
    DayTypeSplit {
        business: group_mean(&business),
        other: group_mean(&other),
    }
}

fn group_mean(records: &[&DayRecord]) -> GroupMean {
    let n = records.len();
    let mean = if n > 0 {
        records.iter().map(|r| r.consumption).sum::<f64>() / n as f64
    } else {
        0.0
    };
    GroupMean { n, mean }
}

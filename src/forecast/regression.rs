//! Linear regression of consumption on other fields.
//!
//! - simple: `consumption = b0 + b1 · x`, closed form on centered sums
//! - multiple: `consumption = b0 + Σ bj · xj`, least squares via SVD

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use tracing::warn;

use crate::domain::{DayRecord, Field};
use crate::math::{fit_least_squares, r_squared};

/// `consumption = intercept + slope · x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearModel {
    pub x: Field,
    pub intercept: f64,
    pub slope: f64,
    pub r_squared: f64,
    pub n: usize,
}

impl LinearModel {
    pub fn predict(&self, record: &DayRecord) -> f64 {
        self.intercept + self.slope * self.x.value(record)
    }
}

/// Fit the simple regression. A constant regressor gives slope `0` (the model
/// collapses to the mean). `None` for an empty slice.
pub fn fit_simple(records: &[DayRecord], x: Field) -> Option<LinearModel> {
    if records.is_empty() {
        return None;
    }
    let n = records.len() as f64;
    let mean_x = records.iter().map(|r| x.value(r)).sum::<f64>() / n;
    let mean_y = records.iter().map(|r| r.consumption).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for r in records {
        let dx = x.value(r) - mean_x;
        sxy += dx * (r.consumption - mean_y);
        sxx += dx * dx;
    }
    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    let intercept = mean_y - slope * mean_x;

    let y: Vec<f64> = records.iter().map(|r| r.consumption).collect();
    let fitted: Vec<f64> = records.iter().map(|r| intercept + slope * x.value(r)).collect();

    Some(LinearModel {
        x,
        intercept,
        slope,
        r_squared: r_squared(&y, &fitted),
        n: records.len(),
    })
}

/// `consumption = coefficients[0] + Σ coefficients[j+1] · regressors[j]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultipleModel {
    pub regressors: Vec<Field>,
    /// Intercept first, then one coefficient per regressor.
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    pub n: usize,
}

impl MultipleModel {
    pub fn predict(&self, record: &DayRecord) -> f64 {
        self.regressors
            .iter()
            .zip(&self.coefficients[1..])
            .fold(self.coefficients[0], |acc, (f, b)| acc + b * f.value(record))
    }
}

/// Fit the multiple regression.
///
/// Needs more days than parameters; returns `None` (with a warning) when the
/// data is too short or the design cannot be solved.
pub fn fit_multiple(records: &[DayRecord], regressors: &[Field]) -> Option<MultipleModel> {
    let p = regressors.len() + 1;
    if regressors.is_empty() || records.len() <= p {
        warn!(
            n = records.len(),
            params = p,
            "not enough days for multiple regression"
        );
        return None;
    }

    let mut data = Vec::with_capacity(records.len() * p);
    for r in records {
        data.push(1.0);
        data.extend(regressors.iter().map(|f| f.value(r)));
    }
    let x = DMatrix::from_row_slice(records.len(), p, &data);
    let y = DVector::from_iterator(records.len(), records.iter().map(|r| r.consumption));

    let Some(fit) = fit_least_squares(&x, &y) else {
        warn!("multiple regression design is ill-conditioned");
        return None;
    };

    Some(MultipleModel {
        regressors: regressors.to_vec(),
        coefficients: fit.beta.iter().copied().collect(),
        r_squared: fit.r_squared,
        n: records.len(),
    })
}

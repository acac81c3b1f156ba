//! Ordinary least squares.
//!
//! Used for the multiple regression of consumption on weather/occupancy
//! regressors:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! The design matrix is tall (days ≫ regressors), so we solve through SVD
//! rather than a square-system decomposition. Regressors such as the workday
//! indicator can be nearly collinear with occupancy, hence the relaxed
//! tolerances.

use nalgebra::{DMatrix, DVector};

/// Coefficients plus in-sample fit quality.
#[derive(Debug, Clone)]
pub struct LeastSquaresFit {
    pub beta: DVector<f64>,
    pub r_squared: f64,
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || x.nrows() == 0 {
        return None;
    }
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve and report R².
pub fn fit_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<LeastSquaresFit> {
    let beta = solve_least_squares(x, y)?;
    let fitted = x * &beta;
    let r_squared = r_squared(y.as_slice(), fitted.as_slice());
    Some(LeastSquaresFit { beta, r_squared })
}

/// Coefficient of determination. `0.0` when `y` has no variance.
pub fn r_squared(y: &[f64], fitted: &[f64]) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let sst: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    if sst == 0.0 {
        return 0.0;
    }
    let sse: f64 = y.iter().zip(fitted).map(|(a, b)| (a - b).powi(2)).sum();
    1.0 - sse / sst
}

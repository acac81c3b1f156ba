//! Trailing moving average of consumption.

use crate::domain::DayRecord;

/// Days averaged by the moving-average forecast.
pub const MA_WINDOW: usize = 3;

/// Mean consumption of the `window` records *before* index `i`.
///
/// This is the moving-average forecast for day `i`; `None` while fewer than
/// `window` earlier days exist.
pub fn trailing_average(records: &[DayRecord], i: usize, window: usize) -> Option<f64> {
    if window == 0 || i < window || i > records.len() {
        return None;
    }
    let sum: f64 = records[i - window..i].iter().map(|r| r.consumption).sum();
    Some(sum / window as f64)
}

/// Forecast for the day after the last record.
pub fn next_day_average(records: &[DayRecord], window: usize) -> Option<f64> {
    trailing_average(records, records.len(), window)
}

//! One-step-ahead consumption forecasts.
//!
//! - moving average of the last three cleaned days (`moving_average`)
//! - simple and multiple linear regression (`regression`)
//!
//! Fewer than three days is not an error: the report says the data is
//! insufficient and the rest of the run continues.

pub mod moving_average;
pub mod regression;

pub use moving_average::*;
pub use regression::*;

use serde::Serialize;
use tracing::warn;

use crate::domain::{Cleaned, Field, RecordSeries};

/// Minimum number of days for any forecast.
pub const MIN_FORECAST_DAYS: usize = MA_WINDOW;

#[derive(Debug, Clone, Serialize)]
pub struct ForecastSet {
    /// Day number being forecast (last day + 1).
    pub next_day: u32,
    pub moving_average: f64,
    pub simple: LinearModel,
    pub multiple: Option<MultipleModel>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Forecast {
    Insufficient { n: usize, needed: usize },
    Ready(ForecastSet),
}

impl Forecast {
    /// The simple regression, when one was fitted.
    pub fn simple(&self) -> Option<&LinearModel> {
        match self {
            Forecast::Ready(set) => Some(&set.simple),
            Forecast::Insufficient { .. } => None,
        }
    }
}

pub fn forecast(series: &RecordSeries<Cleaned>, regressor: Field, multi_regressors: &[Field]) -> Forecast {
    let records = series.records();
    let n = records.len();

    let (Some(moving_average), Some(simple), Some(last)) = (
        next_day_average(records, MA_WINDOW),
        fit_simple(records, regressor),
        records.last(),
    ) else {
        warn!(n, needed = MIN_FORECAST_DAYS, "insufficient data for forecast");
        return Forecast::Insufficient {
            n,
            needed: MIN_FORECAST_DAYS,
        };
    };

    Forecast::Ready(ForecastSet {
        next_day: last.day + 1,
        moving_average,
        simple,
        multiple: fit_multiple(records, multi_regressors),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::clean;
    use crate::domain::{CleanConfig, DayRecord};

    fn cleaned(values: &[f64]) -> RecordSeries<Cleaned> {
        let records = values
            .iter()
            .enumerate()
            .map(|(i, &v)| DayRecord::with_consumption(i as u32 + 1, v))
            .collect();
        clean(RecordSeries::new(records).unwrap(), &CleanConfig::default())
            .into_run()
            .unwrap()
            .series
    }

    #[test]
    fn two_days_are_insufficient() {
        let f = forecast(&cleaned(&[3.0, 5.0]), Field::Irradiance, &[]);
        match f {
            Forecast::Insufficient { n, needed } => {
                assert_eq!(n, 2);
                assert_eq!(needed, 3);
            }
            Forecast::Ready(_) => panic!("expected insufficient data"),
        }
    }

    #[test]
    fn three_days_forecast_the_fourth() {
        let f = forecast(
            &cleaned(&[3.0, 6.0, 9.0]),
            Field::Irradiance,
            &[Field::Temperature, Field::Humidity],
        );
        let Forecast::Ready(set) = f else {
            panic!("expected a forecast");
        };
        assert_eq!(set.next_day, 4);
        assert!((set.moving_average - 6.0).abs() < 1e-12);
        // three days cannot support two regressors plus intercept
        assert!(set.multiple.is_none());
    }
}

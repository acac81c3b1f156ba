//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - mutated in place by the cleaning stages
//! - read by the analysis/forecast stages
//! - exported to CSV/JSON

use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Weather observations for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Mean air temperature (°C).
    pub temperature: f64,
    /// Relative humidity (%).
    pub humidity: f64,
    /// Solar irradiance (kWh/m²/day).
    pub irradiance: f64,
    /// Mean wind speed (m/s).
    pub wind: f64,
}

/// Values as they were read from the input file.
///
/// `None` means the cell was empty: the parser saw the field as *absent*, which
/// is different from a zero or a negative reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Observed {
    pub consumption: Option<f64>,
    pub solar_generation: Option<f64>,
}

/// One calendar day of energy data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    /// 1-based ordinal day, strictly increasing across a series.
    pub day: u32,
    /// Informational date label (never used in computation).
    pub date: String,
    pub weather: Weather,
    pub occupancy: f64,
    pub is_workday: bool,
    pub is_holiday: bool,
    pub peak_tariff: f64,

    /// Daily consumption (kWh). Repaired by the cleaning pipeline.
    pub consumption: f64,
    /// Daily PV generation (kWh). Negative/missing values are repaired.
    pub solar_generation: f64,
    pub ev_load: f64,
    pub grid_import: f64,

    pub observed: Observed,

    /// `consumption - solar_generation`, set once cleaning completes.
    pub net_consumption: f64,
    /// Global z-score of consumption, set by outlier detection.
    pub z_score: f64,
    pub is_outlier: bool,
}

impl DayRecord {
    /// Build a record with only `day` and `consumption` populated.
    ///
    /// Handy for tests and for re-importing a treated consumption column.
    pub fn with_consumption(day: u32, consumption: f64) -> Self {
        Self {
            day,
            consumption,
            observed: Observed {
                consumption: Some(consumption),
                solar_generation: Some(0.0),
            },
            ..Self::default()
        }
    }

    /// True for a regular working day (workday and not a holiday).
    pub fn is_business_day(&self) -> bool {
        self.is_workday && !self.is_holiday
    }
}

/// A selectable numeric field of a `DayRecord`.
///
/// Used by correlation and regression code instead of string field names, so an
/// unknown selector is rejected when parsed rather than silently read as garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Consumption,
    Temperature,
    Humidity,
    Irradiance,
    Wind,
    Occupancy,
    Workday,
    Holiday,
    PeakTariff,
    SolarGeneration,
    EvLoad,
    GridImport,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Consumption,
        Field::Temperature,
        Field::Humidity,
        Field::Irradiance,
        Field::Wind,
        Field::Occupancy,
        Field::Workday,
        Field::Holiday,
        Field::PeakTariff,
        Field::SolarGeneration,
        Field::EvLoad,
        Field::GridImport,
    ];

    /// Fields correlated against consumption by default.
    pub const DEFAULT_CORRELATES: [Field; 5] = [
        Field::Temperature,
        Field::Humidity,
        Field::Occupancy,
        Field::Irradiance,
        Field::Workday,
    ];

    /// Read this field from a record.
    pub fn value(self, r: &DayRecord) -> f64 {
        match self {
            Field::Consumption => r.consumption,
            Field::Temperature => r.weather.temperature,
            Field::Humidity => r.weather.humidity,
            Field::Irradiance => r.weather.irradiance,
            Field::Wind => r.weather.wind,
            Field::Occupancy => r.occupancy,
            Field::Workday => f64::from(u8::from(r.is_workday)),
            Field::Holiday => f64::from(u8::from(r.is_holiday)),
            Field::PeakTariff => r.peak_tariff,
            Field::SolarGeneration => r.solar_generation,
            Field::EvLoad => r.ev_load,
            Field::GridImport => r.grid_import,
        }
    }

    /// Machine name (matches `FromStr` and the JSON summary keys).
    pub fn name(self) -> &'static str {
        match self {
            Field::Consumption => "consumption",
            Field::Temperature => "temperature",
            Field::Humidity => "humidity",
            Field::Irradiance => "irradiance",
            Field::Wind => "wind",
            Field::Occupancy => "occupancy",
            Field::Workday => "workday",
            Field::Holiday => "holiday",
            Field::PeakTariff => "peak_tariff",
            Field::SolarGeneration => "solar_generation",
            Field::EvLoad => "ev_load",
            Field::GridImport => "grid_import",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Field::Consumption => "Consumption",
            Field::Temperature => "Temperature",
            Field::Humidity => "Humidity",
            Field::Irradiance => "Irradiance",
            Field::Wind => "Wind",
            Field::Occupancy => "Occupancy",
            Field::Workday => "Workday",
            Field::Holiday => "Holiday",
            Field::PeakTariff => "Peak tariff",
            Field::SolarGeneration => "Solar generation",
            Field::EvLoad => "EV load",
            Field::GridImport => "Grid import",
        }
    }
}

impl FromStr for Field {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Field::ALL
            .into_iter()
            .find(|f| f.name() == key)
            .ok_or_else(|| {
                let names: Vec<&str> = Field::ALL.iter().map(|f| f.name()).collect();
                AppError::new(
                    2,
                    format!("Unknown field '{s}'. Expected one of: {}.", names.join(", ")),
                )
            })
    }
}

/// Aggregate used to rebuild a flagged value from its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowAggregate {
    /// Mean of the admitted (unflagged) window values.
    #[default]
    Mean,
    /// Order-statistic median of the admitted window values.
    Median,
}

/// How the imputer decides a reading is invalid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImputePolicy {
    /// Treat consumption readings `<= epsilon` as invalid (not only `< 0`).
    pub zero_is_missing: bool,
    pub epsilon: f64,
}

impl Default for ImputePolicy {
    fn default() -> Self {
        Self {
            zero_is_missing: false,
            epsilon: 0.001,
        }
    }
}

/// Tunables of the cleaning pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanConfig {
    pub impute: ImputePolicy,
    /// `|z|` above this flags a day as an outlier.
    pub z_threshold: f64,
    /// Half-width of the replacement window (days on each side).
    pub window_radius: usize,
    pub aggregate: WindowAggregate,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            impute: ImputePolicy::default(),
            z_threshold: 3.0,
            window_radius: 2,
            aggregate: WindowAggregate::Mean,
        }
    }
}

/// Column delimiter of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// Detect from the header line.
    Auto,
    Semicolon,
    Comma,
    Tab,
}

impl Delimiter {
    pub fn byte(self) -> Option<u8> {
        match self {
            Delimiter::Auto => None,
            Delimiter::Semicolon => Some(b';'),
            Delimiter::Comma => Some(b','),
            Delimiter::Tab => Some(b'\t'),
        }
    }
}

/// Decimal separator convention for numeric cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DecimalSeparator {
    /// Per cell: a comma with no dot is read as a decimal comma.
    Auto,
    /// `1234.5`
    Dot,
    /// `1.234,5` (dots are thousands separators)
    Comma,
}

/// A full run's configuration as understood by the application pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub delimiter: Delimiter,
    pub decimal: DecimalSeparator,

    pub clean: CleanConfig,

    /// Fields correlated against consumption.
    pub correlates: Vec<Field>,
    /// Explanatory variable of the simple regression.
    pub regressor: Field,
    /// Explanatory variables of the multiple regression.
    pub multi_regressors: Vec<Field>,

    pub report: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

//! Command-line parsing for the `energy` binary.
//!
//! Argument parsing stays here; `app` turns the parsed flags into the plain
//! config structs the library consumes.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DecimalSeparator, Delimiter, Field, WindowAggregate};

/// Default input file.
pub const DEFAULT_INPUT: &str = "consumo.csv";
/// Default per-day export file.
pub const DEFAULT_EXPORT: &str = "resultado_completo.csv";
/// Default explanatory variable of the simple regression.
pub const DEFAULT_REGRESSOR: Field = Field::Irradiance;
/// Default explanatory variables of the multiple regression.
pub const DEFAULT_MULTI_REGRESSORS: [Field; 4] =
    [Field::Temperature, Field::Occupancy, Field::Irradiance, Field::Workday];

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "energy", version, about = "Daily energy consumption cleaning and analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clean the series, print the full report, and optionally plot/export.
    Analyze(AnalyzeArgs),
    /// Clean the series and write the per-day export only (no report).
    Clean(CleanArgs),
    /// Write a synthetic input file with injected defects.
    Sample(SampleArgs),
}

/// Input file and its format.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Input CSV (header + 14 columns).
    #[arg(short = 'i', long, env = "ENERGY_INPUT", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Column delimiter.
    #[arg(long, value_enum, default_value_t = Delimiter::Auto)]
    pub delimiter: Delimiter,

    /// Decimal separator of numeric cells.
    #[arg(long, value_enum, default_value_t = DecimalSeparator::Auto)]
    pub decimal: DecimalSeparator,
}

/// Cleaning tunables shared by `analyze` and `clean`.
#[derive(Debug, Args, Clone)]
pub struct CleaningArgs {
    /// Flag days whose |z| exceeds this.
    #[arg(long, default_value_t = 3.0)]
    pub z_threshold: f64,

    /// Replacement window half-width (days on each side).
    #[arg(long, default_value_t = 2)]
    pub window_radius: usize,

    /// How a flagged day is rebuilt from its unflagged neighbours.
    #[arg(long, value_enum, default_value_t = WindowAggregate::Mean)]
    pub aggregate: WindowAggregate,

    /// Treat consumption at or below --epsilon as invalid, not only negatives.
    #[arg(long)]
    pub zero_is_missing: bool,

    /// Near-zero cutoff used with --zero-is-missing.
    #[arg(long, default_value_t = 0.001)]
    pub epsilon: f64,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub cleaning: CleaningArgs,

    /// Fields correlated against consumption.
    #[arg(long = "correlate", value_enum, value_delimiter = ',', default_values_t = Field::DEFAULT_CORRELATES)]
    pub correlates: Vec<Field>,

    /// Explanatory variable of the simple regression.
    #[arg(long, value_enum, default_value_t = DEFAULT_REGRESSOR)]
    pub regressor: Field,

    /// Explanatory variables of the multiple regression.
    #[arg(long = "multi", value_enum, value_delimiter = ',', default_values_t = DEFAULT_MULTI_REGRESSORS)]
    pub multi_regressors: Vec<Field>,

    /// Export per-day results to CSV.
    #[arg(long, env = "ENERGY_EXPORT", default_value = DEFAULT_EXPORT)]
    pub export: PathBuf,

    /// Skip the per-day CSV export.
    #[arg(long)]
    pub no_export: bool,

    /// Write a JSON summary of the run.
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Render an ASCII plot of treated consumption.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 90)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct CleanArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub cleaning: CleaningArgs,

    /// Per-day results CSV.
    #[arg(long, env = "ENERGY_EXPORT", default_value = DEFAULT_EXPORT)]
    pub export: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV in the input layout.
    #[arg(short = 'o', long, default_value = DEFAULT_INPUT)]
    pub out: PathBuf,

    /// Number of days to generate.
    #[arg(long, default_value_t = 90)]
    pub days: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First date (YYYY-MM-DD).
    #[arg(long, default_value = "2024-01-01")]
    pub start: NaiveDate,

    /// Probability of a negative consumption reading.
    #[arg(long, default_value_t = 0.03)]
    pub negative_rate: f64,

    /// Probability of an empty consumption or solar cell.
    #[arg(long, default_value_t = 0.03)]
    pub missing_rate: f64,

    /// Probability of a consumption spike.
    #[arg(long, default_value_t = 0.02)]
    pub spike_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn analyze_defaults() {
        let Command::Analyze(a) = parse(&["energy", "analyze"]) else {
            panic!("expected analyze");
        };
        assert_eq!(a.cleaning.z_threshold, 3.0);
        assert_eq!(a.cleaning.window_radius, 2);
        assert_eq!(a.cleaning.aggregate, WindowAggregate::Mean);
        assert_eq!(a.regressor, Field::Irradiance);
        assert_eq!(a.correlates, Field::DEFAULT_CORRELATES.to_vec());
        assert!(!a.plot);
        assert!(!a.no_export);
    }

    #[test]
    fn field_lists_and_enums_parse() {
        let Command::Analyze(a) = parse(&[
            "energy",
            "analyze",
            "--correlate",
            "wind,peak-tariff",
            "--regressor",
            "temperature",
            "--aggregate",
            "median",
            "--delimiter",
            "tab",
        ]) else {
            panic!("expected analyze");
        };
        assert_eq!(a.correlates, vec![Field::Wind, Field::PeakTariff]);
        assert_eq!(a.regressor, Field::Temperature);
        assert_eq!(a.cleaning.aggregate, WindowAggregate::Median);
        assert_eq!(a.input.delimiter, Delimiter::Tab);
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(Cli::try_parse_from(["energy", "analyze", "--regressor", "sunshine"]).is_err());
    }

    #[test]
    fn sample_parses_start_date() {
        let Command::Sample(s) = parse(&["energy", "sample", "--start", "2023-06-01", "--days", "10"]) else {
            panic!("expected sample");
        };
        assert_eq!(s.start, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(s.days, 10);
    }
}
